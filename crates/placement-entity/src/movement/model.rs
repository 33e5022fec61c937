//! Movement ledger entry model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use placement_core::types::{DocumentId, LocationId, MovementId, RecommendationId, UserId};

/// How a movement was initiated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MovementType {
    /// Entered by an operator.
    Manual,
    /// Executed from an approved recommendation.
    Automatic,
    /// Part of a bulk relocation batch.
    Bulk,
}

impl MovementType {
    /// Return the type as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Manual => "manual",
            Self::Automatic => "automatic",
            Self::Bulk => "bulk",
        }
    }
}

/// Outcome of a ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MovementStatus {
    /// Occupancy was transferred.
    Completed,
    /// Recorded but not yet carried out.
    Pending,
    /// Rejected by the occupancy check; nothing changed.
    Failed,
    /// Reversal of an earlier completed entry.
    Rollback,
}

impl MovementStatus {
    /// Return the status as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::Pending => "pending",
            Self::Failed => "failed",
            Self::Rollback => "rollback",
        }
    }

    /// Whether the entry changed where the document is.
    pub fn changed_placement(&self) -> bool {
        matches!(self, Self::Completed | Self::Rollback)
    }
}

impl std::fmt::Display for MovementStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An append-only audit entry describing one relocation attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovementRecord {
    /// Unique ledger entry identifier.
    pub id: MovementId,
    /// The document moved.
    pub document_id: DocumentId,
    /// Source location.
    pub from_location_id: LocationId,
    /// Target location.
    pub to_location_id: LocationId,
    /// When the entry was appended.
    pub timestamp: DateTime<Utc>,
    /// Who performed the move.
    pub actor_id: UserId,
    /// How the move was initiated.
    pub movement_type: MovementType,
    /// Outcome.
    pub status: MovementStatus,
    /// For rollback entries (and failed rollback attempts), the entry being reversed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reverses: Option<MovementId>,
    /// Recommendation that triggered the move.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommendation_id: Option<RecommendationId>,
    /// Why the move failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,
}

/// Command asking the ledger to move a document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovementRequest {
    /// The document to move.
    pub document_id: DocumentId,
    /// Where it is now.
    pub from_location_id: LocationId,
    /// Where it should go.
    pub to_location_id: LocationId,
    /// How the move was initiated.
    pub movement_type: MovementType,
    /// Recommendation being carried out, if any.
    #[serde(default)]
    pub recommendation_id: Option<RecommendationId>,
}

impl MovementRequest {
    /// A manual move.
    pub fn manual(document_id: DocumentId, from: LocationId, to: LocationId) -> Self {
        Self {
            document_id,
            from_location_id: from,
            to_location_id: to,
            movement_type: MovementType::Manual,
            recommendation_id: None,
        }
    }

    /// Change how the move is labelled.
    pub fn with_type(mut self, movement_type: MovementType) -> Self {
        self.movement_type = movement_type;
        self
    }

    /// Link the move to a recommendation.
    pub fn for_recommendation(mut self, id: RecommendationId) -> Self {
        self.recommendation_id = Some(id);
        self
    }
}
