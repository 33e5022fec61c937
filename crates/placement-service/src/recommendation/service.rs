//! Recommendation registry and lifecycle.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use dashmap::{DashMap, DashSet};
use tracing::{info, warn};

use placement_core::error::AppError;
use placement_core::events::{DomainEvent, EventPayload, RecommendationEvent};
use placement_core::result::AppResult;
use placement_core::types::{DocumentId, PageRequest, PageResponse, RecommendationId};
use placement_entity::movement::{MovementRecord, MovementRequest, MovementStatus, MovementType};
use placement_entity::recommendation::{PlacementRecommendation, RecommendationStatus};

use crate::context::OperatorContext;
use crate::events::EventBus;
use crate::movement::MovementLedger;

/// Holds every recommendation ever generated and drives its status.
///
/// Expired recommendations stay stored for audit but vanish from every
/// filtered query and refuse further transitions. A document has at most one
/// pending recommendation: submitting a newer one supersedes the older.
#[derive(Debug)]
pub struct RecommendationService {
    /// Recommendation ID → recommendation
    recommendations: DashMap<RecommendationId, PlacementRecommendation>,
    /// Approved recommendations whose move is being recorded right now.
    /// Claimed and released only while holding the recommendation's entry.
    in_flight: DashSet<RecommendationId>,
    /// Serialises submissions so supersession sees every earlier batch.
    submit_lock: Mutex<()>,
    /// Ledger used to carry out approved moves.
    ledger: Arc<MovementLedger>,
    /// Event bus.
    events: Arc<EventBus>,
}

impl RecommendationService {
    /// Creates a new registry.
    pub fn new(ledger: Arc<MovementLedger>, events: Arc<EventBus>) -> Self {
        Self {
            recommendations: DashMap::new(),
            in_flight: DashSet::new(),
            submit_lock: Mutex::new(()),
            ledger,
            events,
        }
    }

    /// Store freshly generated recommendations.
    ///
    /// Unexpired pending recommendations for the same document generated no
    /// later than the new one are marked superseded.
    pub fn submit(&self, recommendations: Vec<PlacementRecommendation>) {
        let _guard = self.submit_lock.lock().unwrap_or_else(|e| e.into_inner());
        let system = OperatorContext::system();
        for rec in recommendations {
            for stale in self.pending_for(rec.document_id) {
                self.supersede(&system, stale, &rec);
            }
            self.events.publish(DomainEvent::new(
                None,
                EventPayload::Recommendation(RecommendationEvent::Generated {
                    recommendation_id: rec.id,
                    document_id: rec.document_id,
                    to_location_id: rec.to_location_id,
                    priority: rec.priority.to_string(),
                }),
            ));
            self.recommendations.insert(rec.id, rec);
        }
    }

    /// Look up one recommendation, expired or not.
    pub fn get(&self, id: RecommendationId) -> AppResult<PlacementRecommendation> {
        self.recommendations
            .get(&id)
            .map(|r| r.value().clone())
            .ok_or_else(|| AppError::not_found(format!("Recommendation {id} not found")))
    }

    /// Pending, unexpired recommendations, newest first.
    pub fn list_pending(
        &self,
        now: DateTime<Utc>,
        page: &PageRequest,
    ) -> PageResponse<PlacementRecommendation> {
        let mut pending: Vec<PlacementRecommendation> = self
            .recommendations
            .iter()
            .filter(|r| r.is_actionable(now))
            .map(|r| r.value().clone())
            .collect();
        pending.sort_by(|a, b| {
            b.generated_at
                .cmp(&a.generated_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        PageResponse::from_items(pending, page)
    }

    /// Unexpired recommendations in any status, oldest first.
    pub fn list_active(&self, now: DateTime<Utc>) -> Vec<PlacementRecommendation> {
        let mut active: Vec<PlacementRecommendation> = self
            .recommendations
            .iter()
            .filter(|r| !r.is_expired(now))
            .map(|r| r.value().clone())
            .collect();
        sort_oldest_first(&mut active);
        active
    }

    /// Every stored recommendation, including expired ones.
    pub fn audit_all(&self) -> Vec<PlacementRecommendation> {
        let mut all: Vec<PlacementRecommendation> = self
            .recommendations
            .iter()
            .map(|r| r.value().clone())
            .collect();
        sort_oldest_first(&mut all);
        all
    }

    /// Accept a pending recommendation.
    pub fn approve(
        &self,
        ctx: &OperatorContext,
        id: RecommendationId,
        now: DateTime<Utc>,
    ) -> AppResult<PlacementRecommendation> {
        self.transition(ctx, id, now, RecommendationStatus::Approved)
    }

    /// Decline a pending recommendation.
    pub fn reject(
        &self,
        ctx: &OperatorContext,
        id: RecommendationId,
        now: DateTime<Utc>,
    ) -> AppResult<PlacementRecommendation> {
        self.transition(ctx, id, now, RecommendationStatus::Rejected)
    }

    /// Carry out an approved recommendation through the ledger.
    ///
    /// The recommendation is claimed before the move is recorded, so a
    /// concurrent reject or a second implement fails instead of racing the
    /// ledger. If the target has filled up since approval the ledger records
    /// a failed move, the recommendation stays approved, and a capacity
    /// error is returned.
    pub fn implement(
        &self,
        ctx: &OperatorContext,
        id: RecommendationId,
        now: DateTime<Utc>,
    ) -> AppResult<PlacementRecommendation> {
        let rec = self.claim(id, now)?;
        let outcome = self.record_move(ctx, &rec);
        self.settle(ctx, id, outcome)
    }

    /// Check that `id` may be implemented and mark it in flight.
    fn claim(&self, id: RecommendationId, now: DateTime<Utc>) -> AppResult<PlacementRecommendation> {
        let entry = self
            .recommendations
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found(format!("Recommendation {id} not found")))?;
        Self::check_transition(&entry, now, RecommendationStatus::Implemented)?;
        if !self.in_flight.insert(id) {
            return Err(AppError::conflict(format!(
                "Recommendation {id} is already being implemented"
            )));
        }
        Ok(entry.value().clone())
    }

    fn record_move(
        &self,
        ctx: &OperatorContext,
        rec: &PlacementRecommendation,
    ) -> AppResult<MovementRecord> {
        let request = MovementRequest::manual(rec.document_id, rec.from_location_id, rec.to_location_id)
            .with_type(MovementType::Automatic)
            .for_recommendation(rec.id);
        let movement = self.ledger.record(ctx, request)?;
        if movement.status == MovementStatus::Failed {
            let reason = movement
                .failure_reason
                .unwrap_or_else(|| "target location is full".to_string());
            warn!(recommendation_id = %rec.id, movement_id = %movement.id, %reason, "Recommendation could not be implemented");
            return Err(AppError::capacity_exceeded(format!(
                "Recommendation {} could not be implemented: {reason}",
                rec.id
            )));
        }
        Ok(movement)
    }

    /// Release the claim and, if the move went through, mark it implemented.
    fn settle(
        &self,
        ctx: &OperatorContext,
        id: RecommendationId,
        outcome: AppResult<MovementRecord>,
    ) -> AppResult<PlacementRecommendation> {
        let entry = self.recommendations.get_mut(&id);
        self.in_flight.remove(&id);
        let mut entry =
            entry.ok_or_else(|| AppError::not_found(format!("Recommendation {id} not found")))?;
        let movement = outcome?;

        entry.status = RecommendationStatus::Implemented;
        entry.implemented_movement_id = Some(movement.id);
        let updated = entry.value().clone();
        drop(entry);

        info!(
            recommendation_id = %id,
            movement_id = %movement.id,
            actor = %ctx.username,
            "Recommendation implemented"
        );
        self.publish_status(ctx, id, RecommendationStatus::Approved, RecommendationStatus::Implemented);
        Ok(updated)
    }

    fn pending_for(&self, document_id: DocumentId) -> Vec<RecommendationId> {
        self.recommendations
            .iter()
            .filter(|r| r.document_id == document_id && r.status == RecommendationStatus::Pending)
            .map(|r| r.id)
            .collect()
    }

    fn supersede(&self, ctx: &OperatorContext, id: RecommendationId, newer: &PlacementRecommendation) {
        let Some(mut entry) = self.recommendations.get_mut(&id) else {
            return;
        };
        if entry.generated_at > newer.generated_at
            || Self::check_transition(&entry, newer.generated_at, RecommendationStatus::Superseded)
                .is_err()
        {
            return;
        }
        entry.status = RecommendationStatus::Superseded;
        drop(entry);

        info!(
            recommendation_id = %id,
            superseded_by = %newer.id,
            document_id = %newer.document_id,
            "Recommendation superseded"
        );
        self.publish_status(ctx, id, RecommendationStatus::Pending, RecommendationStatus::Superseded);
    }

    fn transition(
        &self,
        ctx: &OperatorContext,
        id: RecommendationId,
        now: DateTime<Utc>,
        next: RecommendationStatus,
    ) -> AppResult<PlacementRecommendation> {
        let mut entry = self
            .recommendations
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found(format!("Recommendation {id} not found")))?;
        Self::check_transition(&entry, now, next)?;
        if self.in_flight.contains(&id) {
            return Err(AppError::conflict(format!(
                "Recommendation {id} is being implemented"
            )));
        }

        let previous = entry.status;
        entry.status = next;
        entry.decided_by = Some(ctx.actor_id);
        entry.decided_at = Some(now);
        let updated = entry.value().clone();
        drop(entry);

        info!(
            recommendation_id = %id,
            from = %previous,
            to = %next,
            actor = %ctx.username,
            "Recommendation status changed"
        );
        self.publish_status(ctx, id, previous, next);
        Ok(updated)
    }

    fn check_transition(
        rec: &PlacementRecommendation,
        now: DateTime<Utc>,
        next: RecommendationStatus,
    ) -> AppResult<()> {
        if rec.is_expired(now) {
            return Err(AppError::validation(format!(
                "Recommendation {} expired at {}",
                rec.id, rec.valid_until
            )));
        }
        if !rec.status.can_transition_to(next) {
            return Err(AppError::validation(format!(
                "Recommendation {} cannot go from {} to {next}",
                rec.id, rec.status
            )));
        }
        Ok(())
    }

    fn publish_status(
        &self,
        ctx: &OperatorContext,
        id: RecommendationId,
        from: RecommendationStatus,
        to: RecommendationStatus,
    ) {
        self.events.publish(DomainEvent::new(
            Some(ctx.actor_id),
            EventPayload::Recommendation(RecommendationEvent::StatusChanged {
                recommendation_id: id,
                from_status: from.to_string(),
                to_status: to.to_string(),
            }),
        ));
    }
}

fn sort_oldest_first(recs: &mut [PlacementRecommendation]) {
    recs.sort_by(|a, b| {
        a.generated_at
            .cmp(&b.generated_at)
            .then_with(|| a.id.cmp(&b.id))
    });
}
