//! Append-only movement ledger.

use std::sync::{Arc, Mutex, RwLock};

use chrono::Utc;
use dashmap::DashMap;
use tracing::{error, info, warn};

use placement_core::error::{AppError, ErrorKind};
use placement_core::events::{DomainEvent, EventPayload, MovementEvent};
use placement_core::result::AppResult;
use placement_core::types::{DocumentId, LocationId, MovementId};
use placement_entity::movement::{MovementRecord, MovementRequest, MovementStatus, MovementType};
use placement_store::{AccessPatternStore, LocationGraph, OccupancyChange};

use crate::context::OperatorContext;
use crate::events::EventBus;

/// Executes document moves and keeps their audit trail.
///
/// Every record and rollback for a document runs under that document's
/// lock, so the location check, occupancy transfer and ledger append are
/// one step as far as other moves of the same document can tell.
#[derive(Debug)]
pub struct MovementLedger {
    /// Occupancy owner.
    graph: Arc<LocationGraph>,
    /// Current-location owner.
    access: Arc<AccessPatternStore>,
    /// Event bus.
    events: Arc<EventBus>,
    /// Entries in append order.
    records: RwLock<Vec<MovementRecord>>,
    /// Document ID → serialisation lock
    document_locks: DashMap<DocumentId, Arc<Mutex<()>>>,
}

impl MovementLedger {
    /// Creates a new ledger.
    pub fn new(
        graph: Arc<LocationGraph>,
        access: Arc<AccessPatternStore>,
        events: Arc<EventBus>,
    ) -> Self {
        Self {
            graph,
            access,
            events,
            records: RwLock::new(Vec::new()),
            document_locks: DashMap::new(),
        }
    }

    /// Move a document.
    ///
    /// A move rejected for lack of room is still written to the ledger as
    /// `failed` and returned as `Ok`; the caller inspects `status`.
    pub fn record(
        &self,
        ctx: &OperatorContext,
        request: MovementRequest,
    ) -> AppResult<MovementRecord> {
        if request.from_location_id == request.to_location_id {
            return Err(AppError::validation(format!(
                "Document {} cannot move onto its own location",
                request.document_id
            )));
        }

        let lock = self.document_lock(request.document_id);
        let _guard = lock.lock().unwrap_or_else(|e| e.into_inner());

        let current = self.access.current_location(request.document_id)?;
        if current != request.from_location_id {
            return Err(AppError::validation(format!(
                "Document {} is at {current}, not {}",
                request.document_id, request.from_location_id
            )));
        }

        let mut record = MovementRecord {
            id: MovementId::new(),
            document_id: request.document_id,
            from_location_id: request.from_location_id,
            to_location_id: request.to_location_id,
            timestamp: Utc::now(),
            actor_id: ctx.actor_id,
            movement_type: request.movement_type,
            status: MovementStatus::Completed,
            reverses: None,
            recommendation_id: request.recommendation_id,
            failure_reason: None,
        };

        match self.transfer_then(request.from_location_id, request.to_location_id, || {
            self.access
                .set_current_location(request.document_id, request.to_location_id)
        }) {
            Ok(change) => {
                self.append(record.clone());
                info!(
                    movement_id = %record.id,
                    document_id = %record.document_id,
                    from = %record.from_location_id,
                    to = %record.to_location_id,
                    from_occupancy = change.from_occupancy,
                    to_occupancy = change.to_occupancy,
                    actor = %ctx.username,
                    "Document moved"
                );
                self.publish(
                    ctx,
                    MovementEvent::Recorded {
                        movement_id: record.id,
                        document_id: record.document_id,
                        from_location_id: record.from_location_id,
                        to_location_id: record.to_location_id,
                    },
                );
                Ok(record)
            }
            Err(e) if e.kind == ErrorKind::CapacityExceeded => {
                record.status = MovementStatus::Failed;
                record.failure_reason = Some(e.message.clone());
                self.append(record.clone());
                warn!(
                    movement_id = %record.id,
                    document_id = %record.document_id,
                    reason = %e.message,
                    "Document move failed"
                );
                self.publish(
                    ctx,
                    MovementEvent::Failed {
                        movement_id: record.id,
                        document_id: record.document_id,
                        reason: e.message,
                    },
                );
                Ok(record)
            }
            Err(e) => Err(e),
        }
    }

    /// Execute several moves as a batch, each labelled `bulk`.
    ///
    /// Moves are independent: one failing does not stop the rest.
    pub fn record_bulk(
        &self,
        ctx: &OperatorContext,
        requests: Vec<MovementRequest>,
    ) -> Vec<AppResult<MovementRecord>> {
        let total = requests.len();
        let results: Vec<_> = requests
            .into_iter()
            .map(|req| self.record(ctx, req.with_type(MovementType::Bulk)))
            .collect();
        let completed = results
            .iter()
            .filter(|r| matches!(r, Ok(rec) if rec.status == MovementStatus::Completed))
            .count();
        info!(total, completed, actor = %ctx.username, "Bulk move finished");
        results
    }

    /// Reverse a completed move.
    ///
    /// Only the latest placement-changing entry of a document can be
    /// reversed; failed attempts after it do not count.
    pub fn rollback(
        &self,
        ctx: &OperatorContext,
        movement_id: MovementId,
    ) -> AppResult<MovementRecord> {
        let target = self.get(movement_id)?;

        let lock = self.document_lock(target.document_id);
        let _guard = lock.lock().unwrap_or_else(|e| e.into_inner());

        if target.status != MovementStatus::Completed {
            return Err(AppError::invalid_rollback(format!(
                "Movement {movement_id} is {} and cannot be rolled back",
                target.status
            )));
        }
        if self.is_superseded(&target) {
            return Err(AppError::invalid_rollback(format!(
                "Movement {movement_id} has been superseded by a later move of document {}",
                target.document_id
            )));
        }

        let mut record = MovementRecord {
            id: MovementId::new(),
            document_id: target.document_id,
            from_location_id: target.to_location_id,
            to_location_id: target.from_location_id,
            timestamp: Utc::now(),
            actor_id: ctx.actor_id,
            movement_type: MovementType::Manual,
            status: MovementStatus::Rollback,
            reverses: Some(target.id),
            recommendation_id: target.recommendation_id,
            failure_reason: None,
        };

        match self.transfer_then(target.to_location_id, target.from_location_id, || {
            self.access
                .set_current_location(target.document_id, target.from_location_id)
        }) {
            Ok(_) => {
                self.append(record.clone());
                info!(
                    movement_id = %record.id,
                    reverses = %target.id,
                    document_id = %target.document_id,
                    actor = %ctx.username,
                    "Movement rolled back"
                );
                self.publish(
                    ctx,
                    MovementEvent::RolledBack {
                        movement_id: record.id,
                        reverses: target.id,
                        document_id: target.document_id,
                    },
                );
                Ok(record)
            }
            Err(e) if e.kind == ErrorKind::CapacityExceeded => {
                record.status = MovementStatus::Failed;
                record.failure_reason = Some(e.message.clone());
                self.append(record.clone());
                warn!(
                    movement_id = %record.id,
                    reverses = %target.id,
                    reason = %e.message,
                    "Rollback failed"
                );
                self.publish(
                    ctx,
                    MovementEvent::Failed {
                        movement_id: record.id,
                        document_id: record.document_id,
                        reason: e.message.clone(),
                    },
                );
                Err(e)
            }
            Err(e) => Err(e),
        }
    }

    /// Ledger entries for one document, oldest first.
    pub fn history(&self, document_id: DocumentId) -> Vec<MovementRecord> {
        self.read_records()
            .iter()
            .filter(|r| r.document_id == document_id)
            .cloned()
            .collect()
    }

    /// One ledger entry.
    pub fn get(&self, movement_id: MovementId) -> AppResult<MovementRecord> {
        self.read_records()
            .iter()
            .find(|r| r.id == movement_id)
            .cloned()
            .ok_or_else(|| AppError::not_found(format!("Movement {movement_id} not found")))
    }

    /// Every entry, in append order.
    pub fn all(&self) -> Vec<MovementRecord> {
        self.read_records().clone()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.read_records().len()
    }

    /// Whether the ledger is empty.
    pub fn is_empty(&self) -> bool {
        self.read_records().is_empty()
    }

    /// Move one document's worth of occupancy, then run `then`. If `then`
    /// fails the occupancy move is reversed before the error is returned.
    fn transfer_then(
        &self,
        from: LocationId,
        to: LocationId,
        then: impl FnOnce() -> AppResult<()>,
    ) -> AppResult<OccupancyChange> {
        let change = self.graph.transfer(from, to)?;
        if let Err(e) = then() {
            if let Err(undo) = self.graph.transfer(to, from) {
                error!(%from, %to, error = %undo.message, "Could not reverse occupancy after a failed move");
            }
            return Err(e);
        }
        Ok(change)
    }

    fn is_superseded(&self, target: &MovementRecord) -> bool {
        let records = self.read_records();
        records
            .iter()
            .skip_while(|r| r.id != target.id)
            .skip(1)
            .any(|r| r.document_id == target.document_id && r.status != MovementStatus::Failed)
    }

    fn document_lock(&self, document_id: DocumentId) -> Arc<Mutex<()>> {
        Arc::clone(
            self.document_locks
                .entry(document_id)
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .value(),
        )
    }

    fn append(&self, record: MovementRecord) {
        self.records
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .push(record);
    }

    fn read_records(&self) -> std::sync::RwLockReadGuard<'_, Vec<MovementRecord>> {
        self.records.read().unwrap_or_else(|e| e.into_inner())
    }

    fn publish(&self, ctx: &OperatorContext, event: MovementEvent) {
        self.events.publish(DomainEvent::new(
            Some(ctx.actor_id),
            EventPayload::Movement(event),
        ));
    }
}
