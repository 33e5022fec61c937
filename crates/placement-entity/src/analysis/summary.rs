//! Aggregate results of an optimization run.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use placement_core::error::{AppError, ErrorKind};
use placement_core::types::DocumentId;

use crate::recommendation::PlacementRecommendation;

/// A per-document failure collected during a bulk scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentError {
    /// The document that could not be analysed.
    pub document_id: DocumentId,
    /// Error category.
    pub kind: ErrorKind,
    /// Error message.
    pub message: String,
}

impl DocumentError {
    /// Capture an error for a document.
    pub fn new(document_id: DocumentId, error: &AppError) -> Self {
        Self {
            document_id,
            kind: error.kind,
            message: error.message.clone(),
        }
    }
}

/// Dashboard summary of an optimization run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizationAnalysis {
    /// Run name.
    pub name: String,
    /// Documents scored (excludes skipped and failed documents).
    pub total_documents_analyzed: u64,
    /// Recommendations emitted.
    pub recommendations_generated: u64,
    /// Sum of positive yearly cost savings across recommendations.
    pub potential_savings: f64,
    /// Mean retrieval time reduction across recommendations, in percent.
    pub efficiency_gain: f64,
    /// Documents skipped by the access threshold or cancellation.
    pub documents_skipped: u64,
    /// Documents that failed.
    pub errors: u64,
    /// Whether the run was cancelled before finishing.
    pub cancelled: bool,
    /// When the run started.
    pub started_at: DateTime<Utc>,
    /// When the run finished.
    pub completed_at: DateTime<Utc>,
}

impl OptimizationAnalysis {
    /// Summarise a finished run.
    #[allow(clippy::too_many_arguments)]
    pub fn summarize(
        name: &str,
        recommendations: &[PlacementRecommendation],
        analyzed: u64,
        skipped: u64,
        errors: u64,
        cancelled: bool,
        started_at: DateTime<Utc>,
        completed_at: DateTime<Utc>,
    ) -> Self {
        let potential_savings = recommendations
            .iter()
            .map(|r| r.expected_benefit.cost_savings_per_year)
            .filter(|s| *s > 0.0)
            .sum();
        let efficiency_gain = if recommendations.is_empty() {
            0.0
        } else {
            recommendations
                .iter()
                .map(|r| r.expected_benefit.time_reduction_percent)
                .sum::<f64>()
                / recommendations.len() as f64
        };

        Self {
            name: name.to_string(),
            total_documents_analyzed: analyzed,
            recommendations_generated: recommendations.len() as u64,
            potential_savings,
            efficiency_gain,
            documents_skipped: skipped,
            errors,
            cancelled,
            started_at,
            completed_at,
        }
    }
}
