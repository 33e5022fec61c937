//! # placement-store
//!
//! Read-mostly registries feeding the placement engine: the hierarchical
//! [`LocationGraph`] with per-location occupancy locking, and the
//! append-only [`AccessPatternStore`]. Both implement the async source
//! traits in [`source`] so that services can be pointed at remote-backed
//! implementations without changing.

pub mod access;
pub mod graph;
pub mod source;

pub use access::AccessPatternStore;
pub use graph::{LocationGraph, OccupancyChange};
pub use source::{AccessSource, LocationSource};
