//! Movement ledger entities.

pub mod model;

pub use model::{MovementRecord, MovementRequest, MovementStatus, MovementType};
