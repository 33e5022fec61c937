//! Append-only per-document access history.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tracing::{debug, info};

use placement_core::error::AppError;
use placement_core::result::AppResult;
use placement_core::types::{DocumentId, LocationId};
use placement_entity::access::{
    AccessEvent, AccessFrequency, AccessPatternType, DocumentAccessProfile,
};

use crate::graph::LocationGraph;
use crate::source::AccessSource;

/// Registry of document access profiles.
///
/// Appends to one document never block readers of another.
#[derive(Debug)]
pub struct AccessPatternStore {
    /// Document ID → access profile
    profiles: DashMap<DocumentId, DocumentAccessProfile>,
    /// Used to check that referenced locations exist.
    graph: Arc<LocationGraph>,
    /// Half-life for the recency-weighted frequency.
    half_life_days: f64,
}

impl AccessPatternStore {
    /// Create an empty store bound to a location graph.
    pub fn new(graph: Arc<LocationGraph>, half_life_days: f64) -> Self {
        Self {
            profiles: DashMap::new(),
            graph,
            half_life_days,
        }
    }

    /// Start tracking a document stored at `location_id`.
    ///
    /// Registration does not touch occupancy; the location's occupancy is
    /// expected to already account for documents it holds.
    pub fn register_document(
        &self,
        document_id: DocumentId,
        location_id: LocationId,
        created_at: DateTime<Utc>,
    ) -> AppResult<DocumentAccessProfile> {
        if !self.graph.contains(location_id) {
            return Err(AppError::not_found(format!(
                "Location {location_id} not found"
            )));
        }
        match self.profiles.entry(document_id) {
            Entry::Occupied(_) => Err(AppError::conflict(format!(
                "Document {document_id} is already registered"
            ))),
            Entry::Vacant(slot) => {
                let profile = DocumentAccessProfile::new(document_id, location_id, created_at);
                slot.insert(profile.clone());
                info!(document_id = %document_id, location_id = %location_id, "Document registered");
                Ok(profile)
            }
        }
    }

    /// Append an access event to a document's history.
    pub fn record_access(&self, document_id: DocumentId, event: AccessEvent) -> AppResult<()> {
        let mut profile = self
            .profiles
            .get_mut(&document_id)
            .ok_or_else(|| AppError::not_found(format!("Document {document_id} not found")))?;
        profile.append(event)?;
        debug!(
            document_id = %document_id,
            total = profile.total_events(),
            "Access recorded"
        );
        Ok(())
    }

    /// Snapshot of a document's profile.
    pub fn get_profile(&self, document_id: DocumentId) -> AppResult<DocumentAccessProfile> {
        self.profiles
            .get(&document_id)
            .map(|r| r.value().clone())
            .ok_or_else(|| AppError::not_found(format!("Document {document_id} not found")))
    }

    /// Windowed frequencies as of `now`.
    pub fn compute_frequency(
        &self,
        document_id: DocumentId,
        now: DateTime<Utc>,
    ) -> AppResult<AccessFrequency> {
        self.profiles
            .get(&document_id)
            .map(|r| r.frequency(now, self.half_life_days))
            .ok_or_else(|| AppError::not_found(format!("Document {document_id} not found")))
    }

    /// Number of accesses inside an arbitrary window ending at `now`.
    pub fn count_in_window(
        &self,
        document_id: DocumentId,
        window: Duration,
        now: DateTime<Utc>,
    ) -> AppResult<u64> {
        self.profiles
            .get(&document_id)
            .map(|r| r.count_in_window(window, now))
            .ok_or_else(|| AppError::not_found(format!("Document {document_id} not found")))
    }

    /// Access pattern class as of `now`.
    pub fn classify_pattern(
        &self,
        document_id: DocumentId,
        now: DateTime<Utc>,
    ) -> AppResult<AccessPatternType> {
        Ok(self.compute_frequency(document_id, now)?.pattern())
    }

    /// Record that a document now lives elsewhere.
    pub fn set_current_location(
        &self,
        document_id: DocumentId,
        location_id: LocationId,
    ) -> AppResult<()> {
        if !self.graph.contains(location_id) {
            return Err(AppError::not_found(format!(
                "Location {location_id} not found"
            )));
        }
        let mut profile = self
            .profiles
            .get_mut(&document_id)
            .ok_or_else(|| AppError::not_found(format!("Document {document_id} not found")))?;
        profile.current_location_id = location_id;
        Ok(())
    }

    /// Current location of a document.
    pub fn current_location(&self, document_id: DocumentId) -> AppResult<LocationId> {
        self.profiles
            .get(&document_id)
            .map(|r| r.current_location_id)
            .ok_or_else(|| AppError::not_found(format!("Document {document_id} not found")))
    }

    /// All registered documents, ordered by id.
    pub fn document_ids(&self) -> Vec<DocumentId> {
        let mut ids: Vec<DocumentId> = self.profiles.iter().map(|r| *r.key()).collect();
        ids.sort();
        ids
    }

    /// Number of registered documents.
    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    /// Whether no documents are registered.
    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

#[async_trait]
impl AccessSource for AccessPatternStore {
    async fn profile(&self, id: DocumentId) -> AppResult<DocumentAccessProfile> {
        self.get_profile(id)
    }

    async fn document_ids(&self) -> AppResult<Vec<DocumentId>> {
        Ok(AccessPatternStore::document_ids(self))
    }
}
