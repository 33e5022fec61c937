//! Scan counters.
//!
//! Thread-safe via atomics for counters and a mutex for duration samples.

use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use serde::Serialize;

/// Maximum number of run-duration samples kept in memory.
const MAX_DURATION_SAMPLES: usize = 100;

/// Counters accumulated across scans.
#[derive(Debug)]
pub struct ScanMetrics {
    /// Scans started.
    pub scans_started: AtomicU64,
    /// Scans that were cancelled part way.
    pub scans_cancelled: AtomicU64,
    /// Documents scored.
    pub documents_analyzed: AtomicU64,
    /// Documents skipped by threshold or cancellation.
    pub documents_skipped: AtomicU64,
    /// Documents that failed.
    pub documents_failed: AtomicU64,
    /// Documents that failed on a store deadline.
    pub documents_timed_out: AtomicU64,
    /// Recommendations emitted.
    pub recommendations_emitted: AtomicU64,
    /// Recent scan durations.
    duration_samples: Mutex<Vec<Duration>>,
}

/// Point-in-time copy of [`ScanMetrics`].
#[derive(Debug, Clone, Serialize)]
pub struct ScanMetricsSnapshot {
    /// Scans started.
    pub scans_started: u64,
    /// Scans cancelled.
    pub scans_cancelled: u64,
    /// Documents scored.
    pub documents_analyzed: u64,
    /// Documents skipped.
    pub documents_skipped: u64,
    /// Documents failed.
    pub documents_failed: u64,
    /// Documents timed out.
    pub documents_timed_out: u64,
    /// Recommendations emitted.
    pub recommendations_emitted: u64,
    /// Mean scan duration in milliseconds.
    pub mean_duration_ms: u64,
}

impl ScanMetrics {
    /// Create an empty collector.
    pub fn new() -> Self {
        Self {
            scans_started: AtomicU64::new(0),
            scans_cancelled: AtomicU64::new(0),
            documents_analyzed: AtomicU64::new(0),
            documents_skipped: AtomicU64::new(0),
            documents_failed: AtomicU64::new(0),
            documents_timed_out: AtomicU64::new(0),
            recommendations_emitted: AtomicU64::new(0),
            duration_samples: Mutex::new(Vec::with_capacity(MAX_DURATION_SAMPLES)),
        }
    }

    /// Record a scan start.
    pub fn record_started(&self) {
        self.scans_started.fetch_add(1, Ordering::Relaxed);
    }

    /// Record the outcome of a finished scan.
    pub fn record_finished(
        &self,
        duration: Duration,
        analyzed: u64,
        skipped: u64,
        recommendations: u64,
        cancelled: bool,
    ) {
        self.documents_analyzed.fetch_add(analyzed, Ordering::Relaxed);
        self.documents_skipped.fetch_add(skipped, Ordering::Relaxed);
        self.recommendations_emitted
            .fetch_add(recommendations, Ordering::Relaxed);
        if cancelled {
            self.scans_cancelled.fetch_add(1, Ordering::Relaxed);
        }
        if let Ok(mut samples) = self.duration_samples.lock() {
            if samples.len() >= MAX_DURATION_SAMPLES {
                samples.remove(0);
            }
            samples.push(duration);
        }
    }

    /// Record a failed document.
    pub fn record_failure(&self, timed_out: bool) {
        self.documents_failed.fetch_add(1, Ordering::Relaxed);
        if timed_out {
            self.documents_timed_out.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Current values.
    pub fn snapshot(&self) -> ScanMetricsSnapshot {
        let samples = self
            .duration_samples
            .lock()
            .map(|s| s.clone())
            .unwrap_or_default();
        let mean_duration_ms = if samples.is_empty() {
            0
        } else {
            samples.iter().map(|d| d.as_millis() as u64).sum::<u64>() / samples.len() as u64
        };

        ScanMetricsSnapshot {
            scans_started: self.scans_started.load(Ordering::Relaxed),
            scans_cancelled: self.scans_cancelled.load(Ordering::Relaxed),
            documents_analyzed: self.documents_analyzed.load(Ordering::Relaxed),
            documents_skipped: self.documents_skipped.load(Ordering::Relaxed),
            documents_failed: self.documents_failed.load(Ordering::Relaxed),
            documents_timed_out: self.documents_timed_out.load(Ordering::Relaxed),
            recommendations_emitted: self.recommendations_emitted.load(Ordering::Relaxed),
            mean_duration_ms,
        }
    }
}

impl Default for ScanMetrics {
    fn default() -> Self {
        Self::new()
    }
}
