//! # placement-entity
//!
//! Domain entity models for the placement engine. Every struct in this
//! crate is a domain value object or a record owned by one of the engine
//! components. All entities derive `Debug`, `Clone`, `Serialize`, and
//! `Deserialize`.

pub mod access;
pub mod analysis;
pub mod location;
pub mod movement;
pub mod recommendation;
