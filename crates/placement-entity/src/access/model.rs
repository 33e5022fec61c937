//! Access profile entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use placement_core::error::AppError;
use placement_core::result::AppResult;
use placement_core::types::{DocumentId, LocationId, UserId};

use super::frequency::{self, AccessFrequency};

/// A single access to a document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessEvent {
    /// When the access started.
    pub timestamp: DateTime<Utc>,
    /// Who accessed the document.
    pub user_id: UserId,
    /// How long the document was out, in seconds.
    pub duration_seconds: u64,
}

impl AccessEvent {
    /// Create an access event.
    pub fn new(timestamp: DateTime<Utc>, user_id: UserId, duration_seconds: u64) -> Self {
        Self {
            timestamp,
            user_id,
            duration_seconds,
        }
    }
}

/// Access history and current placement of one document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentAccessProfile {
    /// The document.
    pub document_id: DocumentId,
    /// Where the document is stored now.
    pub current_location_id: LocationId,
    /// When the document was created. No access may predate it.
    pub created_at: DateTime<Utc>,
    /// Access events in chronological (insertion) order.
    pub access_events: Vec<AccessEvent>,
}

impl DocumentAccessProfile {
    /// Create a profile with no recorded accesses.
    pub fn new(
        document_id: DocumentId,
        current_location_id: LocationId,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            document_id,
            current_location_id,
            created_at,
            access_events: Vec::new(),
        }
    }

    /// Append an access event.
    ///
    /// Events may share a timestamp (each one counts), but they may not
    /// predate the document or the last recorded event.
    pub fn append(&mut self, event: AccessEvent) -> AppResult<()> {
        if event.timestamp < self.created_at {
            return Err(AppError::validation(format!(
                "Access at {} predates creation of document {} at {}",
                event.timestamp, self.document_id, self.created_at
            )));
        }
        if let Some(last) = self.last_access_at() {
            if event.timestamp < last {
                return Err(AppError::validation(format!(
                    "Access at {} is earlier than the last recorded access at {last} for document {}",
                    event.timestamp, self.document_id
                )));
            }
        }
        self.access_events.push(event);
        Ok(())
    }

    /// Total number of recorded events.
    pub fn total_events(&self) -> u64 {
        self.access_events.len() as u64
    }

    /// Timestamp of the most recent event.
    pub fn last_access_at(&self) -> Option<DateTime<Utc>> {
        self.access_events.last().map(|e| e.timestamp)
    }

    /// Windowed frequency as of `now`.
    pub fn frequency(&self, now: DateTime<Utc>, half_life_days: f64) -> AccessFrequency {
        AccessFrequency::compute(&self.access_events, now, half_life_days)
    }

    /// Number of events inside `window` ending at `now`.
    pub fn count_in_window(&self, window: chrono::Duration, now: DateTime<Utc>) -> u64 {
        frequency::count_in_window(&self.access_events, window, now)
    }
}
