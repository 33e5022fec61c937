//! Movement-ledger domain events.

use serde::{Deserialize, Serialize};

use crate::types::{DocumentId, LocationId, MovementId};

/// Events related to document relocations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum MovementEvent {
    /// A document was moved and occupancy updated.
    Recorded {
        /// The ledger entry.
        movement_id: MovementId,
        /// The document that moved.
        document_id: DocumentId,
        /// Source location.
        from_location_id: LocationId,
        /// Target location.
        to_location_id: LocationId,
    },
    /// A movement was rejected by the occupancy check.
    Failed {
        /// The ledger entry recording the failure.
        movement_id: MovementId,
        /// The document that did not move.
        document_id: DocumentId,
        /// Why the move failed.
        reason: String,
    },
    /// A completed movement was reversed.
    RolledBack {
        /// The new rollback entry.
        movement_id: MovementId,
        /// The entry that was reversed.
        reverses: MovementId,
        /// The document that moved back.
        document_id: DocumentId,
    },
}
