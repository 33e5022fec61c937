//! Placement recommendation entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use placement_core::types::{DocumentId, LocationId, MovementId, RecommendationId, UserId};

use super::benefit::{ExpectedBenefit, ImplementationCost};
use super::factor::{OptimizationType, ScoreBreakdown};
use super::priority::Priority;
use super::status::RecommendationStatus;

/// A runner-up location considered for the same document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateSummary {
    /// The candidate location.
    pub location_id: LocationId,
    /// Its placement fitness score.
    pub score: f64,
    /// Estimated cost of moving there.
    pub movement_cost: f64,
}

/// A proposed relocation of one document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlacementRecommendation {
    /// Unique recommendation identifier.
    pub id: RecommendationId,
    /// The document to move.
    pub document_id: DocumentId,
    /// Where the document is now.
    pub from_location_id: LocationId,
    /// Where it should go. Never equal to `from_location_id`.
    pub to_location_id: LocationId,
    /// Factor credited with most of the improvement.
    pub optimization_type: OptimizationType,
    /// Urgency derived from `impact_score`.
    pub priority: Priority,
    /// Projected gains.
    pub expected_benefit: ExpectedBenefit,
    /// Projected cost of carrying out the move.
    pub implementation_cost: ImplementationCost,
    /// Confidence in the recommendation (0 - 100).
    pub confidence: f64,
    /// Normalised improvement (0 - 100).
    pub impact_score: f64,
    /// Fitness score at the current location.
    pub current_score: f64,
    /// Fitness score at the recommended location.
    pub recommended_score: f64,
    /// Factor breakdown at the recommended location.
    pub breakdown: ScoreBreakdown,
    /// Next-best candidates, best first.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub alternatives: Vec<CandidateSummary>,
    /// Lifecycle status.
    pub status: RecommendationStatus,
    /// When the recommendation was produced.
    pub generated_at: DateTime<Utc>,
    /// After this instant the recommendation is unusable.
    pub valid_until: DateTime<Utc>,
    /// Operator who approved or rejected it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decided_by: Option<UserId>,
    /// When it was approved or rejected.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decided_at: Option<DateTime<Utc>>,
    /// Ledger entry that carried it out.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub implemented_movement_id: Option<MovementId>,
}

impl PlacementRecommendation {
    /// Whether the recommendation has passed its validity window.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.valid_until
    }

    /// Whether it still awaits a decision and can be acted on.
    pub fn is_actionable(&self, now: DateTime<Utc>) -> bool {
        self.status == RecommendationStatus::Pending && !self.is_expired(now)
    }

    /// Score gained by the move.
    pub fn score_delta(&self) -> f64 {
        self.recommended_score - self.current_score
    }
}
