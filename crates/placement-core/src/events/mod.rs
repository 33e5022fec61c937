//! Domain events emitted by placement operations.
//!
//! Events are published on the service event bus and consumed by audit
//! and dashboard collaborators outside this workspace.

pub mod movement;
pub mod recommendation;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use movement::MovementEvent;
pub use recommendation::RecommendationEvent;

use crate::types::UserId;

/// Wrapper for all domain events with metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainEvent {
    /// Unique event ID.
    pub id: Uuid,
    /// When the event occurred.
    pub timestamp: DateTime<Utc>,
    /// The operator who caused the event (if applicable).
    pub actor_id: Option<UserId>,
    /// The event payload.
    pub payload: EventPayload,
}

/// Union of all domain event types.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "domain", content = "event")]
pub enum EventPayload {
    /// A movement-ledger event.
    Movement(MovementEvent),
    /// A recommendation lifecycle event.
    Recommendation(RecommendationEvent),
}

impl DomainEvent {
    /// Create a new domain event.
    pub fn new(actor_id: Option<UserId>, payload: EventPayload) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            actor_id,
            payload,
        }
    }
}
