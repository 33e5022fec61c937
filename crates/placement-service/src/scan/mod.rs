//! Bulk recommendation scans.

pub mod metrics;
pub mod runner;

pub use metrics::{ScanMetrics, ScanMetricsSnapshot};
pub use runner::{ScanReport, ScanRequest, ScanRunner};
