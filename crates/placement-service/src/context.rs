//! Operator context carrying who is acting on the ledger and registry.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use placement_core::types::UserId;

/// Context for the operator issuing a command.
///
/// Passed into every mutating service call so that audit records and
/// events know *who* acted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperatorContext {
    /// The operator's ID.
    pub actor_id: UserId,
    /// Display name, for logs.
    pub username: String,
    /// When the command was received.
    pub request_time: DateTime<Utc>,
}

impl OperatorContext {
    /// Creates a new operator context.
    pub fn new(actor_id: UserId, username: impl Into<String>) -> Self {
        Self {
            actor_id,
            username: username.into(),
            request_time: Utc::now(),
        }
    }

    /// Context for moves the engine performs on its own behalf.
    pub fn system() -> Self {
        Self::new(UserId::from_uuid(uuid::Uuid::nil()), "system")
    }

    /// Whether this is the built-in system actor.
    pub fn is_system(&self) -> bool {
        self.actor_id.as_uuid().is_nil()
    }
}
