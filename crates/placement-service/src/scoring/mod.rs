//! Placement fitness scoring.

pub mod engine;
pub mod weights;

pub use engine::{PlacementScore, ScoringEngine, ScoringScope, factor_fits};
pub use weights::ScoringWeights;
