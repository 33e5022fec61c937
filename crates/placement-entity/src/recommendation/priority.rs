//! Recommendation priority.

use serde::{Deserialize, Serialize};

/// Urgency of a recommendation, derived from its impact score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// Impact below 35.
    Low,
    /// Impact 35 - 59.
    Medium,
    /// Impact 60 - 79.
    High,
    /// Impact 80 and above.
    Critical,
}

impl Priority {
    /// Map an impact score (0 - 100) to a priority.
    pub fn from_impact(impact_score: f64) -> Self {
        if impact_score >= 80.0 {
            Self::Critical
        } else if impact_score >= 60.0 {
            Self::High
        } else if impact_score >= 35.0 {
            Self::Medium
        } else {
            Self::Low
        }
    }

    /// Return the priority as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
