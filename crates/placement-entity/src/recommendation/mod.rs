//! Placement recommendation entities.

pub mod benefit;
pub mod factor;
pub mod model;
pub mod priority;
pub mod status;

pub use benefit::{ExpectedBenefit, ImplementationCost};
pub use factor::{FactorValues, OptimizationType, ScoreBreakdown};
pub use model::{CandidateSummary, PlacementRecommendation};
pub use priority::Priority;
pub use status::RecommendationStatus;
