//! Bulk recommendation scan.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use futures::future::join_all;
use serde::Serialize;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};
use validator::Validate;

use placement_core::config::{EngineConfig, ScanConfig};
use placement_core::deadline::with_deadline;
use placement_core::error::{AppError, ErrorKind};
use placement_core::result::AppResult;
use placement_core::types::DocumentId;
use placement_entity::analysis::{DocumentError, OptimizationAnalysis, OptimizationConfig};
use placement_entity::location::{CandidateConstraints, Location};
use placement_entity::recommendation::PlacementRecommendation;
use placement_store::{AccessSource, LocationSource};

use super::metrics::ScanMetrics;
use crate::recommendation::{GenerationOptions, RecommendationGenerator, RecommendationService};
use crate::scoring::ScoringEngine;

/// One scan invocation.
#[derive(Debug, Clone)]
pub struct ScanRequest {
    /// Run parameters from the UI layer.
    pub config: OptimizationConfig,
    /// Reference instant for every access window and validity period.
    pub now: DateTime<Utc>,
}

impl ScanRequest {
    /// A scan evaluated as of `now`.
    pub fn new(config: OptimizationConfig, now: DateTime<Utc>) -> Self {
        Self { config, now }
    }
}

/// Everything a scan produced.
#[derive(Debug, Clone, Serialize)]
pub struct ScanReport {
    /// Emitted recommendations, in document-id order.
    pub recommendations: Vec<PlacementRecommendation>,
    /// Per-document failures, in document-id order.
    pub errors: Vec<DocumentError>,
    /// Dashboard summary.
    pub analysis: OptimizationAnalysis,
}

/// What happened to one document.
#[derive(Debug)]
enum DocumentOutcome {
    Recommended(Box<PlacementRecommendation>),
    Unchanged,
    BelowThreshold,
    OutOfScope,
    Cancelled,
    Failed(AppError),
}

/// Shared, read-only inputs handed to every document task.
#[derive(Debug)]
struct ScanInputs {
    locations: Arc<dyn LocationSource>,
    access: Arc<dyn AccessSource>,
    engine: ScoringEngine,
    generator: RecommendationGenerator,
    options: GenerationOptions,
    scoped: Vec<Location>,
    config: OptimizationConfig,
    explicit_documents: bool,
    store_timeout: Duration,
    now: DateTime<Utc>,
}

/// Runs recommendation passes over many documents.
#[derive(Debug, Clone)]
pub struct ScanRunner {
    /// Location reads.
    locations: Arc<dyn LocationSource>,
    /// Access profile reads.
    access: Arc<dyn AccessSource>,
    /// Where emitted recommendations are stored.
    registry: Arc<RecommendationService>,
    /// Engine settings.
    engine_config: EngineConfig,
    /// Concurrency and deadlines.
    scan_config: ScanConfig,
    /// Scan counters.
    metrics: Arc<ScanMetrics>,
}

impl ScanRunner {
    /// Creates a new runner.
    pub fn new(
        locations: Arc<dyn LocationSource>,
        access: Arc<dyn AccessSource>,
        registry: Arc<RecommendationService>,
        engine_config: EngineConfig,
        scan_config: ScanConfig,
    ) -> Self {
        Self {
            locations,
            access,
            registry,
            engine_config,
            scan_config,
            metrics: Arc::new(ScanMetrics::new()),
        }
    }

    /// Scan counters.
    pub fn metrics(&self) -> &ScanMetrics {
        &self.metrics
    }

    /// Run one scan.
    ///
    /// Malformed weights or scope abort the whole run. Anything that goes
    /// wrong with a single document is collected in the report and the scan
    /// carries on. Cancellation stops documents that have not started yet;
    /// documents already evaluated keep their results.
    #[instrument(skip(self, request, cancel), fields(run = %request.config.name))]
    pub async fn run(
        &self,
        request: ScanRequest,
        cancel: CancellationToken,
    ) -> AppResult<ScanReport> {
        let started_at = Utc::now();
        let clock = Instant::now();
        self.metrics.record_started();

        let ScanRequest { config, now } = request;
        validate_run_config(&config)?;
        let engine = ScoringEngine::new(
            config.weights_or(&self.engine_config.default_weights),
            &self.engine_config.residual,
        )?;
        let store_timeout = Duration::from_millis(self.scan_config.store_timeout_ms);

        // Full locations still bound the normalisation; the generator skips
        // them as targets.
        let constraints = CandidateConstraints::default().within(config.scope.subtree_root);
        let scoped = with_deadline(
            store_timeout,
            "list_candidates",
            self.locations.candidates(&constraints),
        )
        .await?;

        let explicit_documents = config.scope.document_ids.is_some();
        let mut document_ids = match &config.scope.document_ids {
            Some(ids) => ids.clone(),
            None => {
                with_deadline(store_timeout, "document_ids", self.access.document_ids()).await?
            }
        };
        document_ids.sort();
        document_ids.dedup();

        info!(
            documents = document_ids.len(),
            locations = scoped.len(),
            "Starting placement scan"
        );

        let inputs = Arc::new(ScanInputs {
            locations: Arc::clone(&self.locations),
            access: Arc::clone(&self.access),
            engine,
            generator: RecommendationGenerator::new(self.engine_config.clone()),
            options: GenerationOptions {
                alternatives: config.analysis_depth.alternatives(),
                focus: config.focus,
            },
            scoped,
            config: config.clone(),
            explicit_documents,
            store_timeout,
            now,
        });

        let limiter = Arc::new(Semaphore::new(self.scan_config.concurrency.max(1)));
        let handles: Vec<_> = document_ids
            .iter()
            .map(|&document_id| {
                let inputs = Arc::clone(&inputs);
                let limiter = Arc::clone(&limiter);
                let cancel = cancel.clone();
                tokio::spawn(async move {
                    let Ok(_permit) = limiter.acquire().await else {
                        return DocumentOutcome::Failed(AppError::internal(
                            "Scan concurrency limiter closed",
                        ));
                    };
                    if cancel.is_cancelled() {
                        return DocumentOutcome::Cancelled;
                    }
                    match evaluate_document(&inputs, document_id).await {
                        Ok(outcome) => outcome,
                        Err(e) => DocumentOutcome::Failed(e),
                    }
                })
            })
            .collect();
        let joined = join_all(handles).await;

        let mut recommendations = Vec::new();
        let mut errors = Vec::new();
        let (mut analyzed, mut skipped, mut cancelled) = (0u64, 0u64, false);
        for (document_id, joined) in document_ids.into_iter().zip(joined) {
            let outcome = joined.unwrap_or_else(|e| {
                DocumentOutcome::Failed(AppError::internal(format!("Scan task failed: {e}")))
            });
            match outcome {
                DocumentOutcome::Recommended(rec) => {
                    analyzed += 1;
                    recommendations.push(*rec);
                }
                DocumentOutcome::Unchanged => analyzed += 1,
                DocumentOutcome::BelowThreshold => skipped += 1,
                DocumentOutcome::OutOfScope => {}
                DocumentOutcome::Cancelled => {
                    skipped += 1;
                    cancelled = true;
                }
                DocumentOutcome::Failed(e) => {
                    warn!(document_id = %document_id, kind = %e.kind, error = %e.message, "Document scan failed");
                    self.metrics.record_failure(e.kind == ErrorKind::Timeout);
                    errors.push(DocumentError::new(document_id, &e));
                }
            }
        }

        self.registry.submit(recommendations.clone());

        let analysis = OptimizationAnalysis::summarize(
            &config.name,
            &recommendations,
            analyzed,
            skipped,
            errors.len() as u64,
            cancelled,
            started_at,
            Utc::now(),
        );
        self.metrics.record_finished(
            clock.elapsed(),
            analyzed,
            skipped,
            recommendations.len() as u64,
            cancelled,
        );
        info!(
            analyzed,
            skipped,
            errors = errors.len(),
            recommendations = recommendations.len(),
            cancelled,
            elapsed_ms = clock.elapsed().as_millis() as u64,
            "Placement scan finished"
        );

        Ok(ScanReport {
            recommendations,
            errors,
            analysis,
        })
    }
}

/// Reject run parameters the engine cannot honour.
///
/// The four primary weights summing to 100 is a form rule; the engine
/// normalises, so that check alone is not fatal here.
fn validate_run_config(config: &OptimizationConfig) -> AppResult<()> {
    if let Err(errors) = config.validate() {
        let mut fields: Vec<String> = errors
            .errors()
            .keys()
            .map(|k| k.to_string())
            .filter(|k| k.as_str() != "weighting_factors")
            .collect();
        if !fields.is_empty() {
            fields.sort();
            return Err(AppError::invalid_configuration(format!(
                "Invalid optimization config fields: {}",
                fields.join(", ")
            )));
        }
    }
    Ok(())
}

async fn evaluate_document(
    inputs: &ScanInputs,
    document_id: DocumentId,
) -> AppResult<DocumentOutcome> {
    let profile = with_deadline(
        inputs.store_timeout,
        "get_profile",
        inputs.access.profile(document_id),
    )
    .await?;

    if let (Some(root), false) = (inputs.config.scope.subtree_root, inputs.explicit_documents) {
        let in_scope = with_deadline(
            inputs.store_timeout,
            "is_within",
            inputs.locations.is_within(profile.current_location_id, root),
        )
        .await?;
        if !in_scope {
            return Ok(DocumentOutcome::OutOfScope);
        }
    }

    let window = chrono::Duration::days(i64::from(inputs.config.time_frame_days));
    let accesses = profile.count_in_window(window, inputs.now);
    if accesses < inputs.config.min_access_threshold {
        debug!(
            document_id = %document_id,
            accesses,
            threshold = inputs.config.min_access_threshold,
            "Below access threshold"
        );
        return Ok(DocumentOutcome::BelowThreshold);
    }

    let current = with_deadline(
        inputs.store_timeout,
        "get_location",
        inputs.locations.location(profile.current_location_id),
    )
    .await?;

    Ok(
        match inputs.generator.evaluate(
            &inputs.engine,
            &profile,
            &current,
            &inputs.scoped,
            &inputs.options,
            inputs.now,
        ) {
            Some(rec) => DocumentOutcome::Recommended(Box::new(rec)),
            None => DocumentOutcome::Unchanged,
        },
    )
}
