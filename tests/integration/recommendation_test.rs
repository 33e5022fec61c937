//! Recommendation registry lifecycle tests.

mod helpers;

use chrono::{Duration, Utc};
use tokio_util::sync::CancellationToken;

use placement_core::config::ScanConfig;
use placement_core::events::{EventPayload, RecommendationEvent};
use placement_core::types::{PageRequest, RecommendationId};
use placement_core::ErrorKind;
use placement_entity::analysis::{OptimizationConfig, OptimizationScope};
use placement_entity::movement::{MovementStatus, MovementType};
use placement_entity::recommendation::{PlacementRecommendation, RecommendationStatus};
use placement_service::ScanRequest;

use helpers::{frequent_scenario, operator, FrequentScenario};

async fn scanned(now: chrono::DateTime<Utc>) -> (FrequentScenario, PlacementRecommendation) {
    let s = frequent_scenario(now);
    let report = s
        .facility
        .runner(ScanConfig::default())
        .run(
            ScanRequest::new(OptimizationConfig::named("Lifecycle"), now),
            CancellationToken::new(),
        )
        .await
        .expect("scan");
    let rec = report.recommendations[0].clone();
    (s, rec)
}

#[tokio::test]
async fn test_scan_submits_pending_recommendation() {
    let now = Utc::now();
    let (s, rec) = scanned(now).await;
    let page = s.facility.registry.list_pending(now, &PageRequest::default());
    assert_eq!(page.total_items, 1);
    assert_eq!(page.items[0].id, rec.id);
    assert_eq!(page.items[0].status, RecommendationStatus::Pending);
}

#[tokio::test]
async fn test_approve_then_implement_moves_document() {
    let now = Utc::now();
    let (s, rec) = scanned(now).await;
    let ctx = operator();

    let approved = s.facility.registry.approve(&ctx, rec.id, now).unwrap();
    assert_eq!(approved.status, RecommendationStatus::Approved);
    assert_eq!(approved.decided_by, Some(ctx.actor_id));

    let implemented = s.facility.registry.implement(&ctx, rec.id, now).unwrap();
    assert_eq!(implemented.status, RecommendationStatus::Implemented);
    let movement_id = implemented.implemented_movement_id.expect("movement id");

    let movement = s.facility.ledger.get(movement_id).unwrap();
    assert_eq!(movement.movement_type, MovementType::Automatic);
    assert_eq!(movement.recommendation_id, Some(rec.id));
    assert_eq!(s.facility.occupancy(s.shelf_a), 7);
    assert_eq!(s.facility.occupancy(s.shelf_b), 4);
    assert_eq!(
        s.facility.access.current_location(s.document).unwrap(),
        s.shelf_b
    );
}

#[tokio::test]
async fn test_illegal_transitions_rejected() {
    let now = Utc::now();
    let (s, rec) = scanned(now).await;
    let ctx = operator();

    let err = s.facility.registry.implement(&ctx, rec.id, now).unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);

    s.facility.registry.reject(&ctx, rec.id, now).unwrap();
    let err = s.facility.registry.approve(&ctx, rec.id, now).unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);
    assert_eq!(
        s.facility.registry.get(rec.id).unwrap().status,
        RecommendationStatus::Rejected
    );

    let err = s
        .facility
        .registry
        .approve(&ctx, RecommendationId::new(), now)
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
}

#[tokio::test]
async fn test_expired_recommendations_hidden_but_audited() {
    let now = Utc::now();
    let (s, rec) = scanned(now).await;
    let later = rec.valid_until + Duration::seconds(1);

    assert_eq!(
        s.facility
            .registry
            .list_pending(later, &PageRequest::default())
            .total_items,
        0
    );
    assert!(s.facility.registry.list_active(later).is_empty());
    let audit = s.facility.registry.audit_all();
    assert_eq!(audit.len(), 1);
    assert_eq!(audit[0].id, rec.id);

    let err = s
        .facility
        .registry
        .approve(&operator(), rec.id, later)
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);
}

#[tokio::test]
async fn test_still_valid_at_expiry_instant() {
    let now = Utc::now();
    let (s, rec) = scanned(now).await;
    assert_eq!(s.facility.registry.list_active(rec.valid_until).len(), 1);
}

#[tokio::test]
async fn test_implement_into_full_target_keeps_approval() {
    let now = Utc::now();
    let (s, rec) = scanned(now).await;
    let ctx = operator();
    s.facility.registry.approve(&ctx, rec.id, now).unwrap();

    let free = 10 - s.facility.occupancy(s.shelf_b);
    s.facility
        .graph
        .update_occupancy(s.shelf_b, i64::from(free))
        .unwrap();

    let err = s.facility.registry.implement(&ctx, rec.id, now).unwrap_err();
    assert_eq!(err.kind, ErrorKind::CapacityExceeded);
    assert_eq!(
        s.facility.registry.get(rec.id).unwrap().status,
        RecommendationStatus::Approved
    );
    let history = s.facility.ledger.history(s.document);
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].status, MovementStatus::Failed);
    assert_eq!(s.facility.occupancy(s.shelf_a), 8);
}

#[tokio::test]
async fn test_pending_list_newest_first_and_paginated() {
    let now = Utc::now();
    let s = frequent_scenario(now);
    let others = [
        s.facility.document(s.shelf_a, 80, now),
        s.facility.document(s.shelf_a, 70, now),
    ];
    let runner = s.facility.runner(ScanConfig::default());
    for (offset, document) in [s.document, others[0], others[1]].into_iter().enumerate() {
        let config = OptimizationConfig::named("Per document").with_scope(OptimizationScope {
            subtree_root: None,
            document_ids: Some(vec![document]),
        });
        runner
            .run(
                ScanRequest::new(config, now + Duration::minutes(offset as i64)),
                CancellationToken::new(),
            )
            .await
            .unwrap();
    }

    let first = s
        .facility
        .registry
        .list_pending(now + Duration::hours(1), &PageRequest::new(1, 2));
    assert_eq!(first.total_items, 3);
    assert_eq!(first.items.len(), 2);
    assert!(first.has_next);
    assert!(first.items[0].generated_at > first.items[1].generated_at);

    let second = s
        .facility
        .registry
        .list_pending(now + Duration::hours(1), &PageRequest::new(2, 2));
    assert_eq!(second.items.len(), 1);
    assert!(second.items[0].generated_at < first.items[1].generated_at);
}

#[tokio::test]
async fn test_rescan_supersedes_pending_recommendation() {
    let now = Utc::now();
    let s = frequent_scenario(now);
    let mut rx = s.facility.events.subscribe();
    let runner = s.facility.runner(ScanConfig::default());
    let mut ids = Vec::new();
    for offset in 0..3 {
        let report = runner
            .run(
                ScanRequest::new(
                    OptimizationConfig::named("Repeat"),
                    now + Duration::minutes(offset),
                ),
                CancellationToken::new(),
            )
            .await
            .unwrap();
        ids.push(report.recommendations[0].id);
    }

    let pending = s
        .facility
        .registry
        .list_pending(now + Duration::hours(1), &PageRequest::default());
    assert_eq!(pending.total_items, 1);
    assert_eq!(pending.items[0].id, ids[2]);
    for id in &ids[..2] {
        assert_eq!(
            s.facility.registry.get(*id).unwrap().status,
            RecommendationStatus::Superseded
        );
    }
    assert_eq!(s.facility.registry.audit_all().len(), 3);

    rx.recv().await.unwrap();
    let superseded = rx.recv().await.unwrap();
    assert!(matches!(
        superseded.payload,
        EventPayload::Recommendation(RecommendationEvent::StatusChanged { recommendation_id, ref to_status, .. })
            if recommendation_id == ids[0] && to_status == "superseded"
    ));
}

#[tokio::test]
async fn test_lifecycle_events_published() {
    let now = Utc::now();
    let s = frequent_scenario(now);
    let mut rx = s.facility.events.subscribe();
    let report = s
        .facility
        .runner(ScanConfig::default())
        .run(
            ScanRequest::new(OptimizationConfig::named("Events"), now),
            CancellationToken::new(),
        )
        .await
        .unwrap();
    let rec_id = report.recommendations[0].id;
    s.facility.registry.approve(&operator(), rec_id, now).unwrap();

    let generated = rx.recv().await.unwrap();
    assert!(matches!(
        generated.payload,
        EventPayload::Recommendation(RecommendationEvent::Generated { recommendation_id, .. })
            if recommendation_id == rec_id
    ));
    let changed = rx.recv().await.unwrap();
    assert!(matches!(
        changed.payload,
        EventPayload::Recommendation(RecommendationEvent::StatusChanged { ref to_status, .. })
            if to_status == "approved"
    ));
}
