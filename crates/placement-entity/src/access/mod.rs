//! Document access telemetry entities.

pub mod frequency;
pub mod model;
pub mod pattern;

pub use frequency::AccessFrequency;
pub use model::{AccessEvent, DocumentAccessProfile};
pub use pattern::AccessPatternType;
