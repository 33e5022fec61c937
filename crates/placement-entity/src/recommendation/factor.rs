//! Placement factors and per-factor score breakdowns.

use serde::{Deserialize, Serialize};

/// The single factor credited with a recommendation's improvement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptimizationType {
    /// Access frequency matched to distance.
    Frequency,
    /// Proximity to the entrance.
    Distance,
    /// Free capacity at the target.
    Capacity,
    /// Environmental suitability.
    Environmental,
    /// Security level.
    Security,
    /// Storage cost.
    Cost,
}

impl OptimizationType {
    /// Precedence used when two factors explain exactly the same share.
    pub const TIE_ORDER: [OptimizationType; 6] = [
        Self::Distance,
        Self::Frequency,
        Self::Capacity,
        Self::Cost,
        Self::Environmental,
        Self::Security,
    ];

    /// Return the type as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Frequency => "frequency",
            Self::Distance => "distance",
            Self::Capacity => "capacity",
            Self::Environmental => "environmental",
            Self::Security => "security",
            Self::Cost => "cost",
        }
    }
}

impl std::fmt::Display for OptimizationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One value per placement factor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FactorValues {
    /// Access-frequency fit.
    pub frequency: f64,
    /// Proximity fit.
    pub distance: f64,
    /// Free-capacity fit.
    pub capacity: f64,
    /// Storage-cost fit.
    pub cost: f64,
    /// Environmental fit.
    pub environmental: f64,
    /// Security fit.
    pub security: f64,
}

impl FactorValues {
    /// Value for a given factor.
    pub fn get(&self, factor: OptimizationType) -> f64 {
        match factor {
            OptimizationType::Frequency => self.frequency,
            OptimizationType::Distance => self.distance,
            OptimizationType::Capacity => self.capacity,
            OptimizationType::Cost => self.cost,
            OptimizationType::Environmental => self.environmental,
            OptimizationType::Security => self.security,
        }
    }

    /// Sum of all six values.
    pub fn total(&self) -> f64 {
        self.frequency + self.distance + self.capacity + self.cost + self.environmental + self.security
    }

    /// Element-wise `self - other`.
    pub fn minus(&self, other: &FactorValues) -> FactorValues {
        FactorValues {
            frequency: self.frequency - other.frequency,
            distance: self.distance - other.distance,
            capacity: self.capacity - other.capacity,
            cost: self.cost - other.cost,
            environmental: self.environmental - other.environmental,
            security: self.security - other.security,
        }
    }

    /// Factor with the largest value; exact ties follow [`OptimizationType::TIE_ORDER`].
    pub fn dominant(&self) -> OptimizationType {
        let mut best = OptimizationType::TIE_ORDER[0];
        for factor in OptimizationType::TIE_ORDER.into_iter().skip(1) {
            if self.get(factor) > self.get(best) + 1e-9 {
                best = factor;
            }
        }
        best
    }
}

/// Raw fits and weighted contributions of one scored placement.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    /// Normalised 0 - 100 fit per factor.
    pub fits: FactorValues,
    /// Fit multiplied by the effective weight; these sum to the score.
    pub contributions: FactorValues,
}
