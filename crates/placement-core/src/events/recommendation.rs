//! Recommendation lifecycle domain events.

use serde::{Deserialize, Serialize};

use crate::types::{DocumentId, LocationId, RecommendationId};

/// Events related to placement recommendations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum RecommendationEvent {
    /// A scan produced a new recommendation.
    Generated {
        /// The recommendation.
        recommendation_id: RecommendationId,
        /// The document it concerns.
        document_id: DocumentId,
        /// Proposed target.
        to_location_id: LocationId,
        /// Priority label (`low` .. `critical`).
        priority: String,
    },
    /// An operator changed a recommendation's status.
    StatusChanged {
        /// The recommendation.
        recommendation_id: RecommendationId,
        /// Previous status label.
        from_status: String,
        /// New status label.
        to_status: String,
    },
}
