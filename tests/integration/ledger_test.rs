//! Movement ledger tests: occupancy invariants, rollback, audit trail.

mod helpers;

use std::sync::Arc;

use chrono::Utc;

use placement_core::events::{EventPayload, MovementEvent};
use placement_core::types::DocumentId;
use placement_core::ErrorKind;
use placement_entity::movement::{MovementRequest, MovementStatus};

use helpers::{frequent_scenario, operator, shelf, TestFacility};

#[test]
fn test_rollback_restores_both_occupancies() {
    let s = frequent_scenario(Utc::now());
    let ctx = operator();
    let before = (s.facility.occupancy(s.shelf_a), s.facility.occupancy(s.shelf_b));

    let moved = s
        .facility
        .ledger
        .record(&ctx, MovementRequest::manual(s.document, s.shelf_a, s.shelf_b))
        .unwrap();
    assert_eq!(moved.status, MovementStatus::Completed);
    assert_ne!(
        (s.facility.occupancy(s.shelf_a), s.facility.occupancy(s.shelf_b)),
        before
    );

    let back = s.facility.ledger.rollback(&ctx, moved.id).unwrap();
    assert_eq!(back.reverses, Some(moved.id));
    assert_eq!(
        (s.facility.occupancy(s.shelf_a), s.facility.occupancy(s.shelf_b)),
        before
    );
    assert_eq!(
        s.facility.access.current_location(s.document).unwrap(),
        s.shelf_a
    );
}

#[test]
fn test_history_is_chronological_and_requeryable() {
    let s = frequent_scenario(Utc::now());
    let ctx = operator();
    let ledger = &s.facility.ledger;

    let first = ledger
        .record(&ctx, MovementRequest::manual(s.document, s.shelf_a, s.shelf_b))
        .unwrap();
    let second = ledger
        .record(&ctx, MovementRequest::manual(s.document, s.shelf_b, s.shelf_a))
        .unwrap();

    let err = ledger.rollback(&ctx, first.id).unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidRollback);

    let third = ledger.rollback(&ctx, second.id).unwrap();
    let history = ledger.history(s.document);
    let ids: Vec<_> = history.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![first.id, second.id, third.id]);
    assert_eq!(ledger.history(s.document), history);
    assert!(history.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
    assert_eq!(ledger.all().len(), 3);
}

#[test]
fn test_unknown_movement_and_document() {
    let s = frequent_scenario(Utc::now());
    let ctx = operator();
    let err = s
        .facility
        .ledger
        .rollback(&ctx, placement_core::types::MovementId::new())
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);

    let err = s
        .facility
        .ledger
        .record(
            &ctx,
            MovementRequest::manual(DocumentId::new(), s.shelf_a, s.shelf_b),
        )
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
}

#[test]
fn test_same_location_move_rejected() {
    let s = frequent_scenario(Utc::now());
    let err = s
        .facility
        .ledger
        .record(
            &operator(),
            MovementRequest::manual(s.document, s.shelf_a, s.shelf_a),
        )
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);
}

#[test]
fn test_concurrent_moves_keep_occupancy_in_bounds() {
    let now = Utc::now();
    let facility = Arc::new(TestFacility::new());
    let left = facility.add(shelf("Left", 5.0, 12, 10, 1.0));
    let right = facility.add(shelf("Right", 50.0, 12, 10, 1.0));
    let docs: Vec<(DocumentId, bool)> = (0..20)
        .map(|i| {
            let at_left = i % 2 == 0;
            let doc = facility.document(if at_left { left } else { right }, 1, now);
            (doc, at_left)
        })
        .collect();

    std::thread::scope(|scope| {
        for &(doc, at_left) in &docs {
            let facility = Arc::clone(&facility);
            scope.spawn(move || {
                let ctx = operator();
                let (mut from, mut to) = if at_left { (left, right) } else { (right, left) };
                for round in 0..10 {
                    let rec = facility
                        .ledger
                        .record(&ctx, MovementRequest::manual(doc, from, to))
                        .unwrap();
                    if rec.status == MovementStatus::Completed {
                        if round % 3 == 0 {
                            facility.ledger.rollback(&ctx, rec.id).ok();
                            if facility.access.current_location(doc).unwrap() == from {
                                continue;
                            }
                        }
                        std::mem::swap(&mut from, &mut to);
                    }
                }
            });
        }
    });

    let l = facility.occupancy(left);
    let r = facility.occupancy(right);
    assert!(l <= 12 && r <= 12);
    assert_eq!(l + r, 20);

    for record in facility.ledger.all() {
        if record.status == MovementStatus::Rollback {
            let original = facility.ledger.get(record.reverses.unwrap()).unwrap();
            assert_eq!(record.from_location_id, original.to_location_id);
            assert_eq!(record.to_location_id, original.from_location_id);
        }
    }
}

#[tokio::test]
async fn test_movement_events_published() {
    let s = frequent_scenario(Utc::now());
    let mut rx = s.facility.events.subscribe();
    let ctx = operator();
    let moved = s
        .facility
        .ledger
        .record(&ctx, MovementRequest::manual(s.document, s.shelf_a, s.shelf_b))
        .unwrap();
    s.facility.ledger.rollback(&ctx, moved.id).unwrap();

    let recorded = rx.recv().await.unwrap();
    assert_eq!(recorded.actor_id, Some(ctx.actor_id));
    assert!(matches!(
        recorded.payload,
        EventPayload::Movement(MovementEvent::Recorded { movement_id, .. }) if movement_id == moved.id
    ));
    let rolled = rx.recv().await.unwrap();
    assert!(matches!(
        rolled.payload,
        EventPayload::Movement(MovementEvent::RolledBack { reverses, .. }) if reverses == moved.id
    ));
}
