//! Projected benefit and cost of a relocation.

use serde::{Deserialize, Serialize};

/// What a relocation is expected to gain.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ExpectedBenefit {
    /// Reduction in retrieval walking distance, in percent (never negative).
    pub time_reduction_percent: f64,
    /// Storage cost saved per year (negative when the target is dearer).
    pub cost_savings_per_year: f64,
    /// Utilisation gap between source and target after the move, in percent.
    pub capacity_improvement_percent: f64,
}

/// What carrying out a relocation costs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ImplementationCost {
    /// Monetary cost of the move.
    pub movement_cost: f64,
    /// Minutes the document is unavailable.
    pub downtime_minutes: f64,
    /// Staff time required.
    pub labor_hours: f64,
}
