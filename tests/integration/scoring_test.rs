//! Scoring and recommendation generation against realistic facilities.

mod helpers;

use chrono::Utc;

use placement_core::config::{ResidualShares, ScanConfig, WeightingFactors};
use placement_entity::access::AccessPatternType;
use placement_entity::analysis::OptimizationConfig;
use placement_entity::recommendation::{OptimizationType, Priority};
use placement_service::{ScanRequest, ScoringEngine, ScoringScope};
use tokio_util::sync::CancellationToken;

use helpers::{frequent_scenario, rare_scenario, shelf, TestFacility};

#[tokio::test]
async fn test_frequent_document_moves_to_near_shelf() {
    let now = Utc::now();
    let s = frequent_scenario(now);
    let report = s
        .facility
        .runner(ScanConfig::default())
        .run(
            ScanRequest::new(OptimizationConfig::named("doc-001"), now),
            CancellationToken::new(),
        )
        .await
        .expect("scan");

    assert_eq!(report.recommendations.len(), 1);
    let rec = &report.recommendations[0];
    assert_eq!(rec.document_id, s.document);
    assert_eq!(rec.from_location_id, s.shelf_a);
    assert_eq!(rec.to_location_id, s.shelf_b);
    assert_eq!(rec.optimization_type, OptimizationType::Distance);
    assert!(matches!(rec.priority, Priority::High | Priority::Critical));
    assert!((rec.current_score - 19.2).abs() < 1e-6);
    assert!((rec.recommended_score - 68.8).abs() < 1e-6);
    assert!(rec.expected_benefit.time_reduction_percent > 80.0);
    assert_eq!(rec.alternatives.len(), 0);
}

#[tokio::test]
async fn test_rare_document_moves_to_archive() {
    let now = Utc::now();
    let s = rare_scenario(now);
    let report = s
        .facility
        .runner(ScanConfig::default())
        .run(
            ScanRequest::new(OptimizationConfig::named("doc-002"), now),
            CancellationToken::new(),
        )
        .await
        .expect("scan");

    assert_eq!(report.recommendations.len(), 1);
    let rec = &report.recommendations[0];
    assert_eq!(rec.from_location_id, s.shelf_a);
    assert_eq!(rec.to_location_id, s.archive);
    assert_eq!(rec.optimization_type, OptimizationType::Frequency);
    assert!(rec.expected_benefit.cost_savings_per_year > 0.0);
    assert!((rec.expected_benefit.cost_savings_per_year - 96.0).abs() < 1e-9);
    assert_eq!(rec.expected_benefit.time_reduction_percent, 0.0);
    assert!((report.analysis.potential_savings - 96.0).abs() < 1e-9);
}

#[tokio::test]
async fn test_filling_an_unrelated_shelf_keeps_scores_stable() {
    let now = Utc::now();
    let s = frequent_scenario(now);
    let far = s.facility.add(shelf("Far", 100.0, 10, 9, 4.0));
    let runner = s.facility.runner(ScanConfig::default());
    let config = OptimizationConfig::named("Stable bounds");

    let before = runner
        .run(ScanRequest::new(config.clone(), now), CancellationToken::new())
        .await
        .unwrap();
    s.facility.graph.update_occupancy(far, 1).unwrap();
    let after = runner
        .run(ScanRequest::new(config, now), CancellationToken::new())
        .await
        .unwrap();

    let (before, after) = (&before.recommendations[0], &after.recommendations[0]);
    assert!((before.current_score - 60.0).abs() < 1e-6);
    assert_eq!(after.current_score, before.current_score);
    assert_eq!(after.recommended_score, before.recommended_score);
    assert_eq!(after.impact_score, before.impact_score);
    assert_eq!(after.priority, before.priority);
    assert_eq!(after.to_location_id, s.shelf_b);
}

#[test]
fn test_score_falls_with_distance_for_frequent_documents() {
    let facility = TestFacility::new();
    let ids: Vec<_> = (0..20)
        .map(|i| facility.add(shelf(&format!("S{i}"), i as f64 * 7.5, 50, 10, 3.0)))
        .collect();
    let locations: Vec<_> = ids
        .iter()
        .map(|id| facility.graph.get_location(*id).unwrap())
        .collect();
    let scope = ScoringScope::from_locations(&locations);
    let engine =
        ScoringEngine::new(&WeightingFactors::default(), &ResidualShares::default()).unwrap();

    for pair in locations.windows(2) {
        let near = engine
            .score(AccessPatternType::Frequent, &pair[0], &scope)
            .unwrap();
        let far = engine
            .score(AccessPatternType::Frequent, &pair[1], &scope)
            .unwrap();
        assert!(near.score >= far.score);
    }
}

#[test]
fn test_uniform_weight_scaling_changes_nothing() {
    let facility = TestFacility::new();
    let a = facility.add(shelf("A", 12.0, 30, 7, 5.0));
    let b = facility.add(shelf("B", 48.0, 10, 9, 1.5));
    let locations = [
        facility.graph.get_location(a).unwrap(),
        facility.graph.get_location(b).unwrap(),
    ];
    let scope = ScoringScope::from_locations(&locations);
    let residual = ResidualShares::default();
    let ones = ScoringEngine::new(&WeightingFactors::new(1.0, 1.0, 1.0, 1.0), &residual).unwrap();
    let twos = ScoringEngine::new(&WeightingFactors::new(2.0, 2.0, 2.0, 2.0), &residual).unwrap();

    for pattern in [
        AccessPatternType::Frequent,
        AccessPatternType::Occasional,
        AccessPatternType::Archived,
    ] {
        for loc in &locations {
            let x = ones.score(pattern, loc, &scope).unwrap();
            let y = twos.score(pattern, loc, &scope).unwrap();
            assert!((x.score - y.score).abs() < 1e-9);
        }
    }
}

#[tokio::test]
async fn test_rerun_without_changes_is_identical() {
    let now = Utc::now();
    let facility = TestFacility::new();
    let far = facility.add(shelf("Far", 60.0, 20, 18, 6.0));
    facility.add(shelf("Near", 3.0, 20, 2, 6.0));
    facility.add(shelf("Archive", 150.0, 500, 40, 1.0));
    for accesses in [0, 2, 12, 45, 120] {
        facility.document(far, accesses, now);
    }

    let runner = facility.runner(ScanConfig::default());
    let config = OptimizationConfig::named("Determinism");
    let first = runner
        .run(ScanRequest::new(config.clone(), now), CancellationToken::new())
        .await
        .unwrap();
    let second = runner
        .run(ScanRequest::new(config, now), CancellationToken::new())
        .await
        .unwrap();

    let key = |r: &placement_entity::recommendation::PlacementRecommendation| {
        (
            r.document_id,
            r.to_location_id,
            r.optimization_type,
            r.priority,
            r.recommended_score.to_bits(),
            r.current_score.to_bits(),
        )
    };
    assert!(!first.recommendations.is_empty());
    assert_eq!(
        first.recommendations.iter().map(key).collect::<Vec<_>>(),
        second.recommendations.iter().map(key).collect::<Vec<_>>()
    );
}

#[tokio::test]
async fn test_deep_analysis_reports_alternatives() {
    let now = Utc::now();
    let facility = TestFacility::new();
    let far = facility.add(shelf("Far", 90.0, 10, 9, 4.0));
    for i in 0..6 {
        facility.add(shelf(&format!("Near {i}"), 2.0 + i as f64, 10, 1, 4.0));
    }
    facility.document(far, 80, now);

    let config = OptimizationConfig::named("Deep")
        .with_depth(placement_entity::analysis::AnalysisDepth::Deep);
    let report = facility
        .runner(ScanConfig::default())
        .run(ScanRequest::new(config, now), CancellationToken::new())
        .await
        .unwrap();
    let rec = &report.recommendations[0];
    assert_eq!(rec.alternatives.len(), 5);
    assert!(rec
        .alternatives
        .windows(2)
        .all(|w| w[0].score >= w[1].score));
    assert!(rec.alternatives.iter().all(|c| c.score <= rec.recommended_score));
}
