//! Per-document recommendation generation.

use std::cmp::Ordering;

use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use placement_core::config::EngineConfig;
use placement_core::types::RecommendationId;
use placement_entity::access::DocumentAccessProfile;
use placement_entity::location::Location;
use placement_entity::recommendation::{
    CandidateSummary, ImplementationCost, OptimizationType, PlacementRecommendation,
    Priority, RecommendationStatus,
};

use super::estimate::{self, CostEstimator};
use crate::scoring::{PlacementScore, ScoringEngine, ScoringScope};

/// Per-run knobs for generation.
#[derive(Debug, Clone, Copy, Default)]
pub struct GenerationOptions {
    /// Runner-up candidates to attach.
    pub alternatives: usize,
    /// Only emit recommendations of this type.
    pub focus: Option<OptimizationType>,
}

/// A scored candidate with the cost of moving there.
#[derive(Debug, Clone)]
struct RankedCandidate<'a> {
    location: &'a Location,
    score: PlacementScore,
    cost: ImplementationCost,
}

/// Turns a document's access profile and a candidate snapshot into at most
/// one relocation recommendation.
#[derive(Debug, Clone)]
pub struct RecommendationGenerator {
    config: EngineConfig,
    estimator: CostEstimator,
}

impl RecommendationGenerator {
    /// Build from engine settings.
    pub fn new(config: EngineConfig) -> Self {
        Self {
            estimator: CostEstimator::new(&config),
            config,
        }
    }

    /// Engine settings in use.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Evaluate one document.
    ///
    /// `current` must be the location the profile points at. `scoped` is
    /// every storage location in the run's scope, full or not: together with
    /// `current` it fixes the distance and cost bounds, so a shelf filling
    /// up elsewhere never shifts another document's scores. Only scoped
    /// locations other than `current` with a free slot are candidates.
    /// Returns `None` when no candidate beats the current placement by more
    /// than the minimum improvement, or when the winning type is outside the
    /// focus.
    pub fn evaluate(
        &self,
        engine: &ScoringEngine,
        profile: &DocumentAccessProfile,
        current: &Location,
        scoped: &[Location],
        options: &GenerationOptions,
        now: DateTime<Utc>,
    ) -> Option<PlacementRecommendation> {
        let pattern = profile
            .frequency(now, self.config.recency_half_life_days)
            .pattern();
        let scope = ScoringScope::from_locations(scoped.iter().chain(std::iter::once(current)));

        let baseline = engine.score(pattern, current, &scope);
        let current_score = baseline.map(|s| s.score).unwrap_or(0.0);
        let current_contributions = baseline
            .map(|s| s.breakdown.contributions)
            .unwrap_or_default();

        let mut ranked: Vec<RankedCandidate<'_>> = scoped
            .iter()
            .filter(|loc| loc.id != current.id && loc.free_capacity() >= 1)
            .filter_map(|loc| {
                engine.score(pattern, loc, &scope).map(|score| RankedCandidate {
                    location: loc,
                    score,
                    cost: self.estimator.implementation_cost(current, loc),
                })
            })
            .collect();
        ranked.sort_by(rank_order);

        let best = ranked.first()?;
        let delta = best.score.score - current_score;
        if delta <= self.config.min_improvement {
            debug!(
                document_id = %profile.document_id,
                current_score,
                best_score = best.score.score,
                "No candidate clears the improvement threshold"
            );
            return None;
        }

        let optimization_type = best
            .score
            .breakdown
            .contributions
            .minus(&current_contributions)
            .dominant();
        if options.focus.is_some_and(|focus| focus != optimization_type) {
            debug!(
                document_id = %profile.document_id,
                optimization_type = %optimization_type,
                "Recommendation outside run focus"
            );
            return None;
        }

        let impact_score = estimate::impact_score(current_score, best.score.score);
        let alternatives = ranked
            .iter()
            .skip(1)
            .take(options.alternatives)
            .map(|c| CandidateSummary {
                location_id: c.location.id,
                score: c.score.score,
                movement_cost: c.cost.movement_cost,
            })
            .collect();

        Some(PlacementRecommendation {
            id: RecommendationId::new(),
            document_id: profile.document_id,
            from_location_id: current.id,
            to_location_id: best.location.id,
            optimization_type,
            priority: Priority::from_impact(impact_score),
            expected_benefit: self.estimator.expected_benefit(current, best.location),
            implementation_cost: best.cost,
            confidence: estimate::confidence(profile.total_events()),
            impact_score,
            current_score,
            recommended_score: best.score.score,
            breakdown: best.score.breakdown,
            alternatives,
            status: RecommendationStatus::Pending,
            generated_at: now,
            valid_until: now + Duration::days(self.config.validity_days),
            decided_by: None,
            decided_at: None,
            implemented_movement_id: None,
        })
    }
}

/// Score descending, then cheaper move, then nearer, then id.
fn rank_order(a: &RankedCandidate<'_>, b: &RankedCandidate<'_>) -> Ordering {
    b.score
        .score
        .total_cmp(&a.score.score)
        .then_with(|| a.cost.movement_cost.total_cmp(&b.cost.movement_cost))
        .then_with(|| {
            a.location
                .distance_from_entrance
                .total_cmp(&b.location.distance_from_entrance)
        })
        .then_with(|| a.location.id.cmp(&b.location.id))
}
