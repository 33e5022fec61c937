//! Projected benefit, cost, impact and confidence of a relocation.

use placement_core::config::{CostModel, EngineConfig};
use placement_entity::location::Location;
use placement_entity::recommendation::{ExpectedBenefit, ImplementationCost};

/// Estimates what moving one document between two locations costs and gains.
#[derive(Debug, Clone, Copy)]
pub struct CostEstimator {
    model: CostModel,
    area_per_document: f64,
}

impl CostEstimator {
    /// Build from engine settings.
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            model: config.cost_model,
            area_per_document: config.area_per_document,
        }
    }

    /// Cost of walking the document out of `from` and into `to`.
    pub fn implementation_cost(&self, from: &Location, to: &Location) -> ImplementationCost {
        let walked = from.distance_from_entrance + to.distance_from_entrance;
        let walking_minutes = if self.model.walking_meters_per_minute > 0.0 {
            walked / self.model.walking_meters_per_minute
        } else {
            0.0
        };
        let downtime_minutes = self.model.handling_minutes + walking_minutes;
        ImplementationCost {
            movement_cost: self.model.base_cost + self.model.cost_per_meter * walked,
            downtime_minutes,
            labor_hours: downtime_minutes / 60.0,
        }
    }

    /// Gains of holding the document at `to` instead of `from`.
    pub fn expected_benefit(&self, from: &Location, to: &Location) -> ExpectedBenefit {
        let d_from = from.distance_from_entrance;
        let d_to = to.distance_from_entrance;
        let time_reduction_percent = if d_from > 0.0 {
            ((d_from - d_to) / d_from * 100.0).max(0.0)
        } else {
            0.0
        };

        let from_util = from.utilization().unwrap_or(0.0);
        let to_util = if to.capacity == 0 {
            1.0
        } else {
            (to.current_occupancy as f64 + 1.0) / to.capacity as f64
        };

        ExpectedBenefit {
            time_reduction_percent,
            cost_savings_per_year: (from.cost_per_unit_area - to.cost_per_unit_area)
                * self.area_per_document
                * 12.0,
            capacity_improvement_percent: (from_util - to_util) * 100.0,
        }
    }
}

/// Improvement normalised by the headroom above the current score, 0 - 100.
pub fn impact_score(current_score: f64, recommended_score: f64) -> f64 {
    let headroom = (100.0 - current_score).max(1.0);
    (100.0 * (recommended_score - current_score) / headroom)
        .clamp(0.0, 100.0)
        .round()
}

/// Confidence grows with the amount of access history, 50 - 99.
pub fn confidence(total_events: u64) -> f64 {
    (50.0 + 5.0 * (1.0 + total_events as f64).log2())
        .clamp(50.0, 99.0)
        .round()
}
