//! Recommendation generation and lifecycle.

pub mod estimate;
pub mod generator;
pub mod service;

pub use estimate::CostEstimator;
pub use generator::{GenerationOptions, RecommendationGenerator};
pub use service::RecommendationService;
