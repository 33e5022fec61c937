//! Location tree structures for hierarchical display.

use serde::{Deserialize, Serialize};

use placement_core::types::LocationId;

/// A node in a location tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationNode {
    /// Location ID.
    pub id: LocationId,
    /// Location name.
    pub name: String,
    /// Full path.
    pub path: String,
    /// Depth level (roots are 0).
    pub depth: u32,
    /// Capacity of this node alone.
    pub capacity: u32,
    /// Occupancy of this node alone.
    pub current_occupancy: u32,
    /// Child location nodes, ordered by id.
    pub children: Vec<LocationNode>,
}

impl LocationNode {
    /// Total capacity of this node and all descendants.
    pub fn total_capacity(&self) -> u64 {
        self.capacity as u64 + self.children.iter().map(|c| c.total_capacity()).sum::<u64>()
    }

    /// Total occupancy of this node and all descendants.
    pub fn total_occupancy(&self) -> u64 {
        self.current_occupancy as u64
            + self.children.iter().map(|c| c.total_occupancy()).sum::<u64>()
    }
}

/// A location tree rooted at one location or at every root.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationTree {
    /// The root node(s) of the tree.
    pub roots: Vec<LocationNode>,
    /// Total number of locations in the tree.
    pub total_locations: u64,
}

impl LocationTree {
    /// Create an empty location tree.
    pub fn empty() -> Self {
        Self {
            roots: Vec::new(),
            total_locations: 0,
        }
    }
}
