//! Recommendation lifecycle status.

use serde::{Deserialize, Serialize};

/// Status of a placement recommendation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecommendationStatus {
    /// Awaiting an operator decision.
    Pending,
    /// Accepted, not yet executed.
    Approved,
    /// Declined by an operator.
    Rejected,
    /// Executed through the movement ledger.
    Implemented,
    /// Replaced by a newer recommendation for the same document.
    Superseded,
}

impl RecommendationStatus {
    /// Whether moving from `self` to `next` is a legal transition.
    pub fn can_transition_to(&self, next: RecommendationStatus) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Approved)
                | (Self::Pending, Self::Rejected)
                | (Self::Pending, Self::Superseded)
                | (Self::Approved, Self::Implemented)
        )
    }

    /// Whether no further transitions are possible.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Rejected | Self::Implemented | Self::Superseded)
    }

    /// Return the status as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Implemented => "implemented",
            Self::Superseded => "superseded",
        }
    }
}

impl std::fmt::Display for RecommendationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
