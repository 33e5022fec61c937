//! Bulk scan configuration.

use serde::{Deserialize, Serialize};

/// Bulk recommendation scan configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Number of documents evaluated concurrently.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    /// Deadline for a single data-store read, in milliseconds.
    #[serde(default = "default_store_timeout")]
    pub store_timeout_ms: u64,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            store_timeout_ms: default_store_timeout(),
        }
    }
}

fn default_concurrency() -> usize {
    4
}

fn default_store_timeout() -> u64 {
    2_000
}
