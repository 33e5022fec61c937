//! Hierarchical storage location registry.

use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, RwLock};

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use tracing::{debug, info};

use placement_core::error::AppError;
use placement_core::result::AppResult;
use placement_core::types::LocationId;
use placement_entity::location::{
    CandidateConstraints, Location, LocationNode, LocationTree, NewLocation,
};

use crate::source::LocationSource;

/// Tree shape of one location; immutable once inserted except for `children`.
#[derive(Debug, Clone)]
struct Topology {
    parent: Option<LocationId>,
    name: String,
    children: BTreeSet<LocationId>,
}

/// Occupancy after a transfer between two locations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OccupancyChange {
    /// New occupancy at the source.
    pub from_occupancy: u32,
    /// New occupancy at the target.
    pub to_occupancy: u32,
}

/// Registry of storage locations.
///
/// Structure lives behind a read-write lock; each location's mutable state
/// sits in its own mutex so that occupancy updates on different locations
/// never contend.
#[derive(Debug, Default)]
pub struct LocationGraph {
    /// Location ID → parent, name, children
    topology: RwLock<HashMap<LocationId, Topology>>,
    /// Location ID → lockable location state
    slots: DashMap<LocationId, Arc<Mutex<Location>>>,
}

fn lock(slot: &Mutex<Location>) -> MutexGuard<'_, Location> {
    slot.lock().unwrap_or_else(|e| e.into_inner())
}

impl LocationGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a location under an existing parent (or as a root).
    pub fn add_location(&self, new: NewLocation) -> AppResult<Location> {
        new.validate()?;
        let id = new.id.unwrap_or_default();

        let mut topology = self.topology.write().unwrap_or_else(|e| e.into_inner());
        if topology.contains_key(&id) {
            return Err(AppError::conflict(format!("Location {id} already exists")));
        }

        let path = match new.parent_id {
            Some(parent_id) => {
                if !topology.contains_key(&parent_id) {
                    return Err(AppError::not_found(format!(
                        "Parent location {parent_id} not found"
                    )));
                }
                let mut names = Self::ancestor_names(&topology, parent_id);
                names.push(new.name.clone());
                names.join("/")
            }
            None => new.name.clone(),
        };

        let now = Utc::now();
        let location = Location {
            id,
            name: new.name.clone(),
            parent_id: new.parent_id,
            path,
            distance_from_entrance: new.distance_from_entrance,
            capacity: new.capacity,
            current_occupancy: new.current_occupancy,
            cost_per_unit_area: new.cost_per_unit_area,
            environmental_score: new.environmental_score,
            security_score: new.security_score,
            created_at: now,
            updated_at: now,
        };

        topology.insert(
            id,
            Topology {
                parent: new.parent_id,
                name: new.name,
                children: BTreeSet::new(),
            },
        );
        if let Some(parent_id) = location.parent_id {
            if let Some(parent) = topology.get_mut(&parent_id) {
                parent.children.insert(id);
            }
        }
        self.slots
            .insert(id, Arc::new(Mutex::new(location.clone())));

        info!(location_id = %id, path = %location.path, capacity = location.capacity, "Location registered");
        Ok(location)
    }

    /// Remove an empty leaf location.
    pub fn remove_location(&self, id: LocationId) -> AppResult<()> {
        let mut topology = self.topology.write().unwrap_or_else(|e| e.into_inner());
        let node = topology
            .get(&id)
            .ok_or_else(|| AppError::not_found(format!("Location {id} not found")))?;
        if !node.children.is_empty() {
            return Err(AppError::conflict(format!(
                "Location {id} still has {} child locations",
                node.children.len()
            )));
        }
        let parent = node.parent;

        let slot = self.slot(id)?;
        let guard = lock(&slot);
        if guard.current_occupancy > 0 {
            return Err(AppError::conflict(format!(
                "Location {id} still holds {} documents",
                guard.current_occupancy
            )));
        }
        self.slots.remove(&id);
        drop(guard);

        topology.remove(&id);
        if let Some(parent_id) = parent {
            if let Some(parent) = topology.get_mut(&parent_id) {
                parent.children.remove(&id);
            }
        }
        info!(location_id = %id, "Location removed");
        Ok(())
    }

    /// Whether a location exists.
    pub fn contains(&self, id: LocationId) -> bool {
        self.slots.contains_key(&id)
    }

    /// Number of registered locations.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether the graph has no locations.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Snapshot of one location.
    pub fn get_location(&self, id: LocationId) -> AppResult<Location> {
        let slot = self.slot(id)?;
        let location = lock(&slot).clone();
        Ok(location)
    }

    /// Ancestor names from the root down to the location itself.
    pub fn get_path(&self, id: LocationId) -> AppResult<Vec<String>> {
        let topology = self.topology.read().unwrap_or_else(|e| e.into_inner());
        if !topology.contains_key(&id) {
            return Err(AppError::not_found(format!("Location {id} not found")));
        }
        Ok(Self::ancestor_names(&topology, id))
    }

    /// Direct children of a location, ordered by id.
    pub fn children(&self, id: LocationId) -> AppResult<Vec<LocationId>> {
        let topology = self.topology.read().unwrap_or_else(|e| e.into_inner());
        topology
            .get(&id)
            .map(|node| node.children.iter().copied().collect())
            .ok_or_else(|| AppError::not_found(format!("Location {id} not found")))
    }

    /// Whether `id` is `root` or one of its descendants.
    pub fn is_within(&self, id: LocationId, root: LocationId) -> bool {
        let topology = self.topology.read().unwrap_or_else(|e| e.into_inner());
        Self::descends_from(&topology, id, root)
    }

    /// Change a location's occupancy by `delta`.
    ///
    /// Fails with a capacity error, leaving occupancy untouched, if the
    /// result would exceed capacity or drop below zero.
    pub fn update_occupancy(&self, id: LocationId, delta: i64) -> AppResult<u32> {
        let slot = self.slot(id)?;
        let mut location = lock(&slot);
        let occupancy = location.apply_delta(delta)?;
        debug!(location_id = %id, delta, occupancy, "Occupancy updated");
        Ok(occupancy)
    }

    /// Move one document's worth of occupancy from `from` to `to`.
    ///
    /// Both locations are locked in ascending id order, so concurrent
    /// transfers in opposite directions cannot deadlock. Either both
    /// counters change or neither does.
    pub fn transfer(&self, from: LocationId, to: LocationId) -> AppResult<OccupancyChange> {
        if from == to {
            return Err(AppError::validation(format!(
                "Cannot transfer location {from} onto itself"
            )));
        }
        let from_slot = self.slot(from)?;
        let to_slot = self.slot(to)?;

        let (mut from_loc, mut to_loc) = if from < to {
            let f = lock(&from_slot);
            let t = lock(&to_slot);
            (f, t)
        } else {
            let t = lock(&to_slot);
            let f = lock(&from_slot);
            (f, t)
        };

        if !from_loc.accepts_delta(-1) {
            return Err(AppError::capacity_exceeded(format!(
                "Location '{}' has no document to release",
                from_loc.path
            )));
        }
        if !to_loc.accepts_delta(1) {
            return Err(AppError::capacity_exceeded(format!(
                "Location '{}' is full ({}/{})",
                to_loc.path, to_loc.current_occupancy, to_loc.capacity
            )));
        }

        let from_occupancy = from_loc.apply_delta(-1)?;
        let to_occupancy = to_loc.apply_delta(1)?;
        Ok(OccupancyChange {
            from_occupancy,
            to_occupancy,
        })
    }

    /// Locations satisfying the constraints, ordered by id.
    ///
    /// Zero-capacity locations never qualify. A subtree root that does not
    /// exist makes the scope malformed.
    pub fn list_candidates(&self, constraints: &CandidateConstraints) -> AppResult<Vec<Location>> {
        let topology = self.topology.read().unwrap_or_else(|e| e.into_inner());
        if let Some(root) = constraints.subtree_root {
            if !topology.contains_key(&root) {
                return Err(AppError::invalid_configuration(format!(
                    "Scope root location {root} does not exist"
                )));
            }
        }

        let mut ids: Vec<LocationId> = topology
            .keys()
            .copied()
            .filter(|id| match constraints.subtree_root {
                Some(root) => Self::descends_from(&topology, *id, root),
                None => true,
            })
            .collect();
        drop(topology);
        ids.sort();

        let candidates = ids
            .into_iter()
            .filter_map(|id| self.get_location(id).ok())
            .filter(|loc| loc.capacity > 0 && loc.free_capacity() >= constraints.min_free_capacity)
            .collect();
        Ok(candidates)
    }

    /// Build a tree rooted at `root`, or a forest of every root location.
    pub fn tree(&self, root: Option<LocationId>) -> AppResult<LocationTree> {
        let topology = self.topology.read().unwrap_or_else(|e| e.into_inner());
        let roots: Vec<LocationId> = match root {
            Some(id) => {
                if !topology.contains_key(&id) {
                    return Err(AppError::not_found(format!("Location {id} not found")));
                }
                vec![id]
            }
            None => {
                let mut roots: Vec<LocationId> = topology
                    .iter()
                    .filter(|(_, node)| node.parent.is_none())
                    .map(|(id, _)| *id)
                    .collect();
                roots.sort();
                roots
            }
        };

        if roots.is_empty() {
            return Ok(LocationTree::empty());
        }

        let mut total = 0u64;
        let nodes = roots
            .into_iter()
            .filter_map(|id| self.build_node(&topology, id, 0, &mut total))
            .collect();
        Ok(LocationTree {
            roots: nodes,
            total_locations: total,
        })
    }

    fn build_node(
        &self,
        topology: &HashMap<LocationId, Topology>,
        id: LocationId,
        depth: u32,
        total: &mut u64,
    ) -> Option<LocationNode> {
        let node = topology.get(&id)?;
        let location = self.get_location(id).ok()?;
        *total += 1;
        let children = node
            .children
            .iter()
            .filter_map(|child| self.build_node(topology, *child, depth + 1, total))
            .collect();
        Some(LocationNode {
            id,
            name: location.name,
            path: location.path,
            depth,
            capacity: location.capacity,
            current_occupancy: location.current_occupancy,
            children,
        })
    }

    fn slot(&self, id: LocationId) -> AppResult<Arc<Mutex<Location>>> {
        self.slots
            .get(&id)
            .map(|r| Arc::clone(r.value()))
            .ok_or_else(|| AppError::not_found(format!("Location {id} not found")))
    }

    fn ancestor_names(topology: &HashMap<LocationId, Topology>, id: LocationId) -> Vec<String> {
        let mut names = Vec::new();
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            match topology.get(&current) {
                Some(node) => {
                    names.push(node.name.clone());
                    cursor = node.parent;
                }
                None => break,
            }
        }
        names.reverse();
        names
    }

    fn descends_from(
        topology: &HashMap<LocationId, Topology>,
        id: LocationId,
        root: LocationId,
    ) -> bool {
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            if current == root {
                return true;
            }
            cursor = topology.get(&current).and_then(|node| node.parent);
        }
        false
    }
}

#[async_trait]
impl LocationSource for LocationGraph {
    async fn location(&self, id: LocationId) -> AppResult<Location> {
        self.get_location(id)
    }

    async fn candidates(&self, constraints: &CandidateConstraints) -> AppResult<Vec<Location>> {
        self.list_candidates(constraints)
    }

    async fn is_within(&self, id: LocationId, root: LocationId) -> AppResult<bool> {
        Ok(LocationGraph::is_within(self, id, root))
    }
}
