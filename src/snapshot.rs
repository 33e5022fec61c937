//! Facility snapshot loaded by the scan binary.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Deserialize;

use placement_core::error::AppError;
use placement_core::result::AppResult;
use placement_core::types::{DocumentId, LocationId};
use placement_entity::access::AccessEvent;
use placement_entity::analysis::OptimizationConfig;
use placement_entity::location::NewLocation;
use placement_store::{AccessPatternStore, LocationGraph};

/// A tracked document and its access history.
#[derive(Debug, Clone, Deserialize)]
pub struct DocumentSnapshot {
    /// The document.
    pub document_id: DocumentId,
    /// Where it is stored.
    pub location_id: LocationId,
    /// When it was created.
    pub created_at: DateTime<Utc>,
    /// Past accesses, oldest first.
    #[serde(default)]
    pub access_events: Vec<AccessEvent>,
}

/// Locations, documents and run parameters read from JSON.
#[derive(Debug, Clone, Deserialize)]
pub struct FacilitySnapshot {
    /// Every location; each must carry an id.
    pub locations: Vec<NewLocation>,
    /// Tracked documents.
    #[serde(default)]
    pub documents: Vec<DocumentSnapshot>,
    /// Run parameters; a default run when absent.
    #[serde(default)]
    pub optimization: Option<OptimizationConfig>,
}

impl FacilitySnapshot {
    /// Read a snapshot file.
    pub fn load(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            AppError::with_source(
                placement_core::ErrorKind::Configuration,
                format!("Cannot read snapshot '{}'", path.display()),
                e,
            )
        })?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Populate the stores.
    ///
    /// Locations may be listed in any order; each is added once its parent
    /// exists.
    pub fn apply(&self, graph: &LocationGraph, access: &AccessPatternStore) -> AppResult<()> {
        let mut remaining: Vec<&NewLocation> = self.locations.iter().collect();
        while !remaining.is_empty() {
            let (ready, blocked): (Vec<&NewLocation>, Vec<&NewLocation>) = remaining
                .into_iter()
                .partition(|loc| loc.parent_id.is_none_or(|parent| graph.contains(parent)));
            if ready.is_empty() {
                let names: Vec<&str> = blocked.iter().map(|l| l.name.as_str()).collect();
                return Err(AppError::validation(format!(
                    "Locations with missing parents: {}",
                    names.join(", ")
                )));
            }
            for loc in ready {
                graph.add_location(loc.clone())?;
            }
            remaining = blocked;
        }

        for doc in &self.documents {
            access.register_document(doc.document_id, doc.location_id, doc.created_at)?;
            for event in &doc.access_events {
                access.record_access(doc.document_id, event.clone())?;
            }
        }
        Ok(())
    }

    /// Run parameters for this snapshot.
    pub fn optimization(&self) -> OptimizationConfig {
        self.optimization
            .clone()
            .unwrap_or_else(|| OptimizationConfig::named("Facility scan"))
    }
}
