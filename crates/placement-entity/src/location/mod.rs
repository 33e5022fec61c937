//! Storage location entities.

pub mod model;
pub mod tree;

pub use model::{CandidateConstraints, Location, NewLocation};
pub use tree::{LocationNode, LocationTree};
