//! Optimization run configuration and dashboard summary entities.

pub mod config;
pub mod summary;

pub use config::{AnalysisDepth, OptimizationConfig, OptimizationScope};
pub use summary::{DocumentError, OptimizationAnalysis};
