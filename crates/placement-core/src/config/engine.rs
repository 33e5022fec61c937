//! Scoring and recommendation engine configuration.

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

/// Caller-supplied weighting vector for the four primary placement factors.
///
/// The UI validates that the four primary weights sum to 100 before a run
/// (see [`Validate`]); the engine itself normalises whatever it receives.
/// `environmental` and `security` are normally left unset, in which case
/// they receive the fixed residual shares from [`ResidualShares`]. When
/// either is set, all six values are treated as raw weights.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_weight_sum"))]
pub struct WeightingFactors {
    /// Weight of the access-frequency fit.
    #[validate(range(min = 0.0, max = 100.0))]
    pub frequency: f64,
    /// Weight of the proximity-to-entrance fit.
    #[validate(range(min = 0.0, max = 100.0))]
    pub distance: f64,
    /// Weight of the free-capacity fit.
    #[validate(range(min = 0.0, max = 100.0))]
    pub capacity: f64,
    /// Weight of the storage-cost fit.
    #[validate(range(min = 0.0, max = 100.0))]
    pub cost: f64,
    /// Optional raw weight overriding the environmental residual share.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0.0))]
    pub environmental: Option<f64>,
    /// Optional raw weight overriding the security residual share.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0.0))]
    pub security: Option<f64>,
}

impl WeightingFactors {
    /// Build a primary-only weighting vector.
    pub fn new(frequency: f64, distance: f64, capacity: f64, cost: f64) -> Self {
        Self {
            frequency,
            distance,
            capacity,
            cost,
            environmental: None,
            security: None,
        }
    }

    /// Override the environmental and security weights with raw values.
    pub fn with_overrides(mut self, environmental: f64, security: f64) -> Self {
        self.environmental = Some(environmental);
        self.security = Some(security);
        self
    }

    /// Sum of the four primary weights.
    pub fn primary_sum(&self) -> f64 {
        self.frequency + self.distance + self.capacity + self.cost
    }

    /// Whether either residual factor was overridden by the caller.
    pub fn has_overrides(&self) -> bool {
        self.environmental.is_some() || self.security.is_some()
    }
}

impl Default for WeightingFactors {
    fn default() -> Self {
        Self::new(30.0, 30.0, 20.0, 20.0)
    }
}

fn validate_weight_sum(weights: &WeightingFactors) -> Result<(), ValidationError> {
    if (weights.primary_sum() - 100.0).abs() > 0.01 {
        return Err(ValidationError::new("weights_must_sum_to_100"));
    }
    Ok(())
}

/// Fixed shares of the final score given to the environmental and security
/// factors when the caller does not override them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResidualShares {
    /// Share of the score (0.0 - 1.0) given to the environmental factor.
    #[serde(default = "default_residual")]
    pub environmental: f64,
    /// Share of the score (0.0 - 1.0) given to the security factor.
    #[serde(default = "default_residual")]
    pub security: f64,
}

impl Default for ResidualShares {
    fn default() -> Self {
        Self {
            environmental: default_residual(),
            security: default_residual(),
        }
    }
}

/// Parameters used to estimate what a relocation costs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CostModel {
    /// Fixed cost of any single move.
    #[serde(default = "default_base_cost")]
    pub base_cost: f64,
    /// Cost per meter walked (out of the source, into the target).
    #[serde(default = "default_cost_per_meter")]
    pub cost_per_meter: f64,
    /// Fixed handling time per move, in minutes.
    #[serde(default = "default_handling_minutes")]
    pub handling_minutes: f64,
    /// Walking speed used to convert distance into downtime.
    #[serde(default = "default_walking_speed")]
    pub walking_meters_per_minute: f64,
}

impl Default for CostModel {
    fn default() -> Self {
        Self {
            base_cost: default_base_cost(),
            cost_per_meter: default_cost_per_meter(),
            handling_minutes: default_handling_minutes(),
            walking_meters_per_minute: default_walking_speed(),
        }
    }
}

/// Engine-wide scoring and recommendation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Minimum score improvement (points) before a move is proposed.
    #[serde(default = "default_min_improvement")]
    pub min_improvement: f64,
    /// How long a recommendation stays usable, in days.
    #[serde(default = "default_validity_days")]
    pub validity_days: i64,
    /// Half-life of the recency-weighted access frequency, in days.
    #[serde(default = "default_half_life")]
    pub recency_half_life_days: f64,
    /// Floor area one document occupies, used for cost savings.
    #[serde(default = "default_area_per_document")]
    pub area_per_document: f64,
    /// Residual environmental/security shares.
    #[serde(default)]
    pub residual: ResidualShares,
    /// Relocation cost estimation parameters.
    #[serde(default)]
    pub cost_model: CostModel,
    /// Weighting used when a run does not supply its own.
    #[serde(default)]
    pub default_weights: WeightingFactors,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            min_improvement: default_min_improvement(),
            validity_days: default_validity_days(),
            recency_half_life_days: default_half_life(),
            area_per_document: default_area_per_document(),
            residual: ResidualShares::default(),
            cost_model: CostModel::default(),
            default_weights: WeightingFactors::default(),
        }
    }
}

fn default_residual() -> f64 {
    0.10
}

fn default_base_cost() -> f64 {
    25.0
}

fn default_cost_per_meter() -> f64 {
    0.5
}

fn default_handling_minutes() -> f64 {
    5.0
}

fn default_walking_speed() -> f64 {
    60.0
}

fn default_min_improvement() -> f64 {
    10.0
}

fn default_validity_days() -> i64 {
    7
}

fn default_half_life() -> f64 {
    7.0
}

fn default_area_per_document() -> f64 {
    1.0
}
