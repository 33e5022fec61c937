//! Storage location entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use placement_core::error::AppError;
use placement_core::result::AppResult;
use placement_core::types::LocationId;

/// A node in the storage hierarchy (building, floor, room, cabinet, shelf).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    /// Unique location identifier.
    pub id: LocationId,
    /// Display name.
    pub name: String,
    /// Parent location, `None` for a root.
    pub parent_id: Option<LocationId>,
    /// Slash-joined ancestor names ending with this location's name.
    pub path: String,
    /// Walking distance from the facility entrance, in meters.
    pub distance_from_entrance: f64,
    /// Maximum number of documents.
    pub capacity: u32,
    /// Documents currently stored here. Never exceeds `capacity`.
    pub current_occupancy: u32,
    /// Storage cost per unit area per month.
    pub cost_per_unit_area: f64,
    /// Environmental suitability (0 - 100).
    pub environmental_score: f64,
    /// Security level (0 - 100).
    pub security_score: f64,
    /// When the location was configured.
    pub created_at: DateTime<Utc>,
    /// When occupancy last changed.
    pub updated_at: DateTime<Utc>,
}

impl Location {
    /// Remaining free slots.
    pub fn free_capacity(&self) -> u32 {
        self.capacity.saturating_sub(self.current_occupancy)
    }

    /// Occupancy as a fraction of capacity (0.0 - 1.0), `None` if capacity is zero.
    pub fn utilization(&self) -> Option<f64> {
        if self.capacity == 0 {
            None
        } else {
            Some(self.current_occupancy as f64 / self.capacity as f64)
        }
    }

    /// Whether applying `delta` keeps occupancy within `0..=capacity`.
    pub fn accepts_delta(&self, delta: i64) -> bool {
        let next = self.current_occupancy as i64 + delta;
        next >= 0 && next <= self.capacity as i64
    }

    /// Apply an occupancy delta, failing without mutation when out of range.
    pub fn apply_delta(&mut self, delta: i64) -> AppResult<u32> {
        if !self.accepts_delta(delta) {
            return Err(AppError::capacity_exceeded(format!(
                "Location '{}' cannot change occupancy {} by {delta} (capacity {})",
                self.path, self.current_occupancy, self.capacity
            )));
        }
        self.current_occupancy = (self.current_occupancy as i64 + delta) as u32;
        self.updated_at = Utc::now();
        Ok(self.current_occupancy)
    }
}

/// Data required to register a new location.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewLocation {
    /// Identifier to use; a random one is generated when absent.
    #[serde(default)]
    pub id: Option<LocationId>,
    /// Display name.
    pub name: String,
    /// Parent location.
    #[serde(default)]
    pub parent_id: Option<LocationId>,
    /// Distance from the entrance, in meters.
    pub distance_from_entrance: f64,
    /// Maximum number of documents.
    pub capacity: u32,
    /// Initial occupancy.
    #[serde(default)]
    pub current_occupancy: u32,
    /// Storage cost per unit area per month.
    #[serde(default)]
    pub cost_per_unit_area: f64,
    /// Environmental suitability (0 - 100).
    pub environmental_score: f64,
    /// Security level (0 - 100).
    pub security_score: f64,
}

impl NewLocation {
    /// Start a root-level location with neutral scores.
    pub fn new(name: impl Into<String>, distance_from_entrance: f64, capacity: u32) -> Self {
        Self {
            id: None,
            name: name.into(),
            parent_id: None,
            distance_from_entrance,
            capacity,
            current_occupancy: 0,
            cost_per_unit_area: 0.0,
            environmental_score: 50.0,
            security_score: 50.0,
        }
    }

    /// Use a fixed identifier.
    pub fn with_id(mut self, id: LocationId) -> Self {
        self.id = Some(id);
        self
    }

    /// Place under a parent location.
    pub fn under(mut self, parent_id: LocationId) -> Self {
        self.parent_id = Some(parent_id);
        self
    }

    /// Set the initial occupancy.
    pub fn occupied(mut self, occupancy: u32) -> Self {
        self.current_occupancy = occupancy;
        self
    }

    /// Set the storage cost.
    pub fn costing(mut self, cost_per_unit_area: f64) -> Self {
        self.cost_per_unit_area = cost_per_unit_area;
        self
    }

    /// Set environmental and security scores.
    pub fn scored(mut self, environmental: f64, security: f64) -> Self {
        self.environmental_score = environmental;
        self.security_score = security;
        self
    }

    /// Check the numeric invariants of a location before it is registered.
    pub fn validate(&self) -> AppResult<()> {
        if self.name.trim().is_empty() {
            return Err(AppError::validation("Location name cannot be empty"));
        }
        if !self.distance_from_entrance.is_finite() || self.distance_from_entrance < 0.0 {
            return Err(AppError::validation(format!(
                "Location '{}' has invalid distance {}",
                self.name, self.distance_from_entrance
            )));
        }
        if !self.cost_per_unit_area.is_finite() || self.cost_per_unit_area < 0.0 {
            return Err(AppError::validation(format!(
                "Location '{}' has invalid cost {}",
                self.name, self.cost_per_unit_area
            )));
        }
        for (label, score) in [
            ("environmental", self.environmental_score),
            ("security", self.security_score),
        ] {
            if !(0.0..=100.0).contains(&score) {
                return Err(AppError::validation(format!(
                    "Location '{}' has {label} score {score} outside 0-100",
                    self.name
                )));
            }
        }
        if self.current_occupancy > self.capacity {
            return Err(AppError::capacity_exceeded(format!(
                "Location '{}' occupancy {} exceeds capacity {}",
                self.name, self.current_occupancy, self.capacity
            )));
        }
        Ok(())
    }
}

/// Filters applied when enumerating candidate locations.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CandidateConstraints {
    /// Minimum number of free slots a candidate must have.
    pub min_free_capacity: u32,
    /// Restrict candidates to this location and its descendants.
    pub subtree_root: Option<LocationId>,
}

impl CandidateConstraints {
    /// Locations able to take at least one more document.
    pub fn with_room() -> Self {
        Self {
            min_free_capacity: 1,
            subtree_root: None,
        }
    }

    /// Restrict to a subtree.
    pub fn within(mut self, root: Option<LocationId>) -> Self {
        self.subtree_root = root;
        self
    }
}
