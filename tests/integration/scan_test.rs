//! Bulk scan tests: partial failure, cancellation, deadlines, scoping.

mod helpers;

use std::sync::Arc;
use std::time::Duration as StdDuration;

use async_trait::async_trait;
use chrono::Utc;
use tokio_util::sync::CancellationToken;

use placement_core::config::{EngineConfig, ScanConfig, WeightingFactors};
use placement_core::result::AppResult;
use placement_core::types::{DocumentId, LocationId};
use placement_core::ErrorKind;
use placement_entity::access::DocumentAccessProfile;
use placement_entity::analysis::{OptimizationConfig, OptimizationScope};
use placement_entity::recommendation::OptimizationType;
use placement_entity::location::NewLocation;
use placement_service::{ScanRequest, ScanRunner};
use placement_store::{AccessPatternStore, AccessSource};

use helpers::{frequent_scenario, rare_scenario, shelf, TestFacility};

/// Access source that stalls on one document.
#[derive(Debug)]
struct StallingAccess {
    inner: Arc<AccessPatternStore>,
    stalled: DocumentId,
}

#[async_trait]
impl AccessSource for StallingAccess {
    async fn profile(&self, id: DocumentId) -> AppResult<DocumentAccessProfile> {
        if id == self.stalled {
            tokio::time::sleep(StdDuration::from_secs(30)).await;
        }
        self.inner.get_profile(id)
    }

    async fn document_ids(&self) -> AppResult<Vec<DocumentId>> {
        Ok(self.inner.document_ids())
    }
}

fn busy_facility(now: chrono::DateTime<Utc>) -> (TestFacility, LocationId, Vec<DocumentId>) {
    let facility = TestFacility::new();
    let far = facility.add(shelf("Far", 80.0, 100, 60, 5.0));
    facility.add(shelf("Near", 4.0, 100, 10, 5.0));
    let docs = (0..12).map(|_| facility.document(far, 70, now)).collect();
    (facility, far, docs)
}

#[tokio::test]
async fn test_unknown_document_is_collected_not_fatal() {
    let now = Utc::now();
    let s = frequent_scenario(now);
    let ghost = DocumentId::new();
    let config = OptimizationConfig::named("Partial").with_scope(OptimizationScope {
        subtree_root: None,
        document_ids: Some(vec![s.document, ghost]),
    });

    let report = s
        .facility
        .runner(ScanConfig::default())
        .run(ScanRequest::new(config, now), CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(report.recommendations.len(), 1);
    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.errors[0].document_id, ghost);
    assert_eq!(report.errors[0].kind, ErrorKind::NotFound);
    assert_eq!(report.analysis.total_documents_analyzed, 1);
    assert_eq!(report.analysis.errors, 1);
}

#[tokio::test]
async fn test_cancelled_scan_skips_remaining_documents() {
    let now = Utc::now();
    let (facility, _, docs) = busy_facility(now);
    let cancel = CancellationToken::new();
    cancel.cancel();

    let report = facility
        .runner(ScanConfig::default())
        .run(
            ScanRequest::new(OptimizationConfig::named("Cancelled"), now),
            cancel,
        )
        .await
        .unwrap();

    assert!(report.analysis.cancelled);
    assert_eq!(report.analysis.documents_skipped, docs.len() as u64);
    assert!(report.recommendations.is_empty());
    assert!(report.errors.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_slow_store_times_out_one_document() {
    let now = Utc::now();
    let (facility, _, docs) = busy_facility(now);
    let stalled = docs[3];
    let access = Arc::new(StallingAccess {
        inner: Arc::clone(&facility.access),
        stalled,
    });
    let runner = ScanRunner::new(
        facility.graph.clone(),
        access,
        Arc::clone(&facility.registry),
        facility.engine_config.clone(),
        ScanConfig {
            concurrency: 3,
            store_timeout_ms: 50,
        },
    );

    let report = runner
        .run(
            ScanRequest::new(OptimizationConfig::named("Deadline"), now),
            CancellationToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.errors[0].document_id, stalled);
    assert_eq!(report.errors[0].kind, ErrorKind::Timeout);
    assert_eq!(report.recommendations.len(), docs.len() - 1);
    assert_eq!(runner.metrics().snapshot().documents_timed_out, 1);
}

#[tokio::test]
async fn test_results_ordered_by_document_id() {
    let now = Utc::now();
    let (facility, _, _) = busy_facility(now);
    let report = facility
        .runner(ScanConfig {
            concurrency: 5,
            store_timeout_ms: 2_000,
        })
        .run(
            ScanRequest::new(OptimizationConfig::named("Ordering"), now),
            CancellationToken::new(),
        )
        .await
        .unwrap();
    assert_eq!(report.recommendations.len(), 12);
    assert!(report
        .recommendations
        .windows(2)
        .all(|w| w[0].document_id < w[1].document_id));
}

#[tokio::test]
async fn test_subtree_scope_limits_documents_and_candidates() {
    let now = Utc::now();
    let facility = TestFacility::new();
    let wing_a = facility.add(NewLocation::new("Wing A", 0.0, 0));
    let wing_b = facility.add(NewLocation::new("Wing B", 0.0, 0));
    let a_far = facility.add(shelf("A far", 60.0, 10, 8, 3.0).under(wing_a));
    let a_near = facility.add(shelf("A near", 5.0, 10, 2, 3.0).under(wing_a));
    let b_far = facility.add(shelf("B far", 60.0, 10, 8, 3.0).under(wing_b));
    facility.add(shelf("B near", 1.0, 10, 0, 3.0).under(wing_b));
    let inside = facility.document(a_far, 90, now);
    facility.document(b_far, 90, now);

    let config = OptimizationConfig::named("Wing A").with_scope(OptimizationScope {
        subtree_root: Some(wing_a),
        document_ids: None,
    });
    let report = facility
        .runner(ScanConfig::default())
        .run(ScanRequest::new(config, now), CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(report.recommendations.len(), 1);
    assert_eq!(report.recommendations[0].document_id, inside);
    assert_eq!(report.recommendations[0].to_location_id, a_near);
    assert_eq!(report.analysis.total_documents_analyzed, 1);
}

#[tokio::test]
async fn test_missing_scope_root_is_fatal() {
    let now = Utc::now();
    let s = frequent_scenario(now);
    let config = OptimizationConfig::named("Bad scope").with_scope(OptimizationScope {
        subtree_root: Some(LocationId::new()),
        document_ids: None,
    });
    let err = s
        .facility
        .runner(ScanConfig::default())
        .run(ScanRequest::new(config, now), CancellationToken::new())
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidConfiguration);
}

#[tokio::test]
async fn test_weights_zero_fatal_but_unnormalised_accepted() {
    let now = Utc::now();
    let s = frequent_scenario(now);
    let runner = s.facility.runner(ScanConfig::default());

    let zero = OptimizationConfig::named("Zero")
        .with_weights(WeightingFactors::new(0.0, 0.0, 0.0, 0.0));
    let err = runner
        .run(ScanRequest::new(zero, now), CancellationToken::new())
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidConfiguration);

    let twos = OptimizationConfig::named("Twos")
        .with_weights(WeightingFactors::new(2.0, 2.0, 2.0, 2.0));
    let report = runner
        .run(ScanRequest::new(twos, now), CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(report.recommendations.len(), 1);
}

#[tokio::test]
async fn test_access_threshold_skips_quiet_documents() {
    let now = Utc::now();
    let s = frequent_scenario(now);
    let quiet = s.facility.document(s.shelf_a, 2, now);
    let mut config = OptimizationConfig::named("Threshold");
    config.min_access_threshold = 5;

    let report = s
        .facility
        .runner(ScanConfig::default())
        .run(ScanRequest::new(config, now), CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(report.analysis.documents_skipped, 1);
    assert!(report
        .recommendations
        .iter()
        .all(|r| r.document_id != quiet));
}

#[tokio::test]
async fn test_invalid_time_frame_is_fatal() {
    let now = Utc::now();
    let s = frequent_scenario(now);
    let mut config = OptimizationConfig::named("Too long");
    config.time_frame_days = 400;
    let err = s
        .facility
        .runner(ScanConfig::default())
        .run(ScanRequest::new(config, now), CancellationToken::new())
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidConfiguration);
}

#[tokio::test]
async fn test_runs_without_weights_use_engine_defaults() {
    let now = Utc::now();
    let s = rare_scenario(now);
    let runner = ScanRunner::new(
        s.facility.graph.clone(),
        s.facility.access.clone(),
        Arc::clone(&s.facility.registry),
        EngineConfig {
            default_weights: WeightingFactors::new(0.0, 0.0, 0.0, 100.0),
            ..EngineConfig::default()
        },
        ScanConfig::default(),
    );

    let report = runner
        .run(
            ScanRequest::new(OptimizationConfig::named("Cost only"), now),
            CancellationToken::new(),
        )
        .await
        .unwrap();
    let rec = &report.recommendations[0];
    assert_eq!(rec.to_location_id, s.archive);
    assert_eq!(rec.optimization_type, OptimizationType::Cost);
    assert_eq!(rec.breakdown.contributions.frequency, 0.0);
    assert_eq!(rec.breakdown.contributions.distance, 0.0);
    assert!((rec.recommended_score - 80.0).abs() < 1e-6);

    let explicit = OptimizationConfig::named("Explicit")
        .with_weights(WeightingFactors::new(30.0, 30.0, 20.0, 20.0));
    let report = runner
        .run(ScanRequest::new(explicit, now), CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(
        report.recommendations[0].optimization_type,
        OptimizationType::Frequency
    );
}

#[tokio::test]
async fn test_unusable_engine_default_weights_are_fatal() {
    let now = Utc::now();
    let s = frequent_scenario(now);
    let runner = ScanRunner::new(
        s.facility.graph.clone(),
        s.facility.access.clone(),
        Arc::clone(&s.facility.registry),
        EngineConfig {
            default_weights: WeightingFactors::new(0.0, 0.0, 0.0, 0.0),
            ..EngineConfig::default()
        },
        ScanConfig::default(),
    );
    let err = runner
        .run(
            ScanRequest::new(OptimizationConfig::named("No weights"), now),
            CancellationToken::new(),
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidConfiguration);
}
