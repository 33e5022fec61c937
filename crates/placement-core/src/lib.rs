//! # placement-core
//!
//! Core crate for the placement optimization engine. Contains configuration
//! schemas, typed identifiers, domain events, pagination types, the
//! data-store deadline helper, and the unified error system.
//!
//! This crate has **no** internal dependencies on other placement crates.

pub mod config;
pub mod deadline;
pub mod error;
pub mod events;
pub mod result;
pub mod types;

pub use error::{AppError, ErrorKind};
pub use result::AppResult;
