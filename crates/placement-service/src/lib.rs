//! # placement-service
//!
//! Service layer for the placement engine. Scores storage locations,
//! generates relocation recommendations, tracks their lifecycle, executes
//! moves through the movement ledger, and runs bulk scans.
//!
//! Services follow constructor injection: every collaborator is handed in
//! as an `Arc` at construction time.

pub mod context;
pub mod events;
pub mod movement;
pub mod recommendation;
pub mod scan;
pub mod scoring;

pub use context::OperatorContext;
pub use events::EventBus;
pub use movement::MovementLedger;
pub use recommendation::{CostEstimator, RecommendationGenerator, RecommendationService};
pub use scan::{ScanMetrics, ScanReport, ScanRequest, ScanRunner};
pub use scoring::{PlacementScore, ScoringEngine, ScoringScope, ScoringWeights};
