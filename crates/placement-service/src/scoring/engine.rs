//! Placement fitness scoring.

use serde::{Deserialize, Serialize};

use placement_core::config::{ResidualShares, WeightingFactors};
use placement_core::result::AppResult;
use placement_core::types::LocationId;
use placement_entity::access::AccessPatternType;
use placement_entity::location::Location;
use placement_entity::recommendation::{FactorValues, ScoreBreakdown};

use super::weights::ScoringWeights;

/// Normalisation bounds shared by every location scored in one pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoringScope {
    /// Largest distance from the entrance among the scoped locations.
    pub max_distance: f64,
    /// Largest storage cost among the scoped locations.
    pub max_cost: f64,
}

impl ScoringScope {
    /// Bounds over a set of locations.
    pub fn from_locations<'a>(locations: impl IntoIterator<Item = &'a Location>) -> Self {
        locations
            .into_iter()
            .fold(Self::default(), |scope, loc| Self {
                max_distance: scope.max_distance.max(loc.distance_from_entrance),
                max_cost: scope.max_cost.max(loc.cost_per_unit_area),
            })
    }

    /// Distance as a percentage of the farthest scoped location.
    fn distance_ratio(&self, distance: f64) -> f64 {
        if self.max_distance <= 0.0 {
            return 0.0;
        }
        (distance / self.max_distance * 100.0).clamp(0.0, 100.0)
    }
}

/// Fitness of one location for one document.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlacementScore {
    /// The scored location.
    pub location_id: LocationId,
    /// Weighted fitness, 0 - 100.
    pub score: f64,
    /// Per-factor fits and contributions.
    pub breakdown: ScoreBreakdown,
}

/// Scores candidate locations with a fixed set of effective weights.
#[derive(Debug, Clone)]
pub struct ScoringEngine {
    weights: ScoringWeights,
}

impl ScoringEngine {
    /// Build an engine, rejecting unusable weights.
    pub fn new(factors: &WeightingFactors, residual: &ResidualShares) -> AppResult<Self> {
        Ok(Self {
            weights: ScoringWeights::resolve(factors, residual)?,
        })
    }

    /// Effective weights in use.
    pub fn weights(&self) -> &ScoringWeights {
        &self.weights
    }

    /// Score a location, or `None` if it can hold nothing at all.
    pub fn score(
        &self,
        pattern: AccessPatternType,
        location: &Location,
        scope: &ScoringScope,
    ) -> Option<PlacementScore> {
        let fits = factor_fits(pattern, location, scope)?;
        let w = self.weights.effective();
        let contributions = FactorValues {
            frequency: fits.frequency * w.frequency,
            distance: fits.distance * w.distance,
            capacity: fits.capacity * w.capacity,
            cost: fits.cost * w.cost,
            environmental: fits.environmental * w.environmental,
            security: fits.security * w.security,
        };
        Some(PlacementScore {
            location_id: location.id,
            score: contributions.total(),
            breakdown: ScoreBreakdown {
                fits,
                contributions,
            },
        })
    }
}

/// Raw 0 - 100 fit of a location on each factor.
///
/// Frequently used documents fit near the entrance, rarely used ones fit
/// far away, and occasional ones are indifferent to distance.
pub fn factor_fits(
    pattern: AccessPatternType,
    location: &Location,
    scope: &ScoringScope,
) -> Option<FactorValues> {
    let utilization = location.utilization()?;
    let ratio = scope.distance_ratio(location.distance_from_entrance);

    let frequency = if pattern.prefers_proximity() {
        100.0 - ratio
    } else if pattern.prefers_remoteness() {
        ratio
    } else {
        50.0
    };
    let cost = if scope.max_cost <= 0.0 {
        100.0
    } else {
        (100.0 * (1.0 - location.cost_per_unit_area / scope.max_cost)).clamp(0.0, 100.0)
    };

    Some(FactorValues {
        frequency,
        distance: 100.0 - ratio,
        capacity: (100.0 * (1.0 - utilization)).clamp(0.0, 100.0),
        cost,
        environmental: location.environmental_score.clamp(0.0, 100.0),
        security: location.security_score.clamp(0.0, 100.0),
    })
}
