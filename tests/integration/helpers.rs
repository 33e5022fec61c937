//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

use placement_core::config::{EngineConfig, ScanConfig};
use placement_core::types::{DocumentId, LocationId, UserId};
use placement_entity::access::AccessEvent;
use placement_entity::location::NewLocation;
use placement_service::{
    EventBus, MovementLedger, OperatorContext, RecommendationService, ScanRunner,
};
use placement_store::{AccessPatternStore, LocationGraph};

/// Test facility context
pub struct TestFacility {
    /// Location registry
    pub graph: Arc<LocationGraph>,
    /// Access history
    pub access: Arc<AccessPatternStore>,
    /// Event bus shared by ledger and registry
    pub events: Arc<EventBus>,
    /// Movement ledger
    pub ledger: Arc<MovementLedger>,
    /// Recommendation registry
    pub registry: Arc<RecommendationService>,
    /// Engine settings
    pub engine_config: EngineConfig,
}

impl TestFacility {
    /// Create an empty facility with default engine settings
    pub fn new() -> Self {
        let engine_config = EngineConfig::default();
        let graph = Arc::new(LocationGraph::new());
        let access = Arc::new(AccessPatternStore::new(
            Arc::clone(&graph),
            engine_config.recency_half_life_days,
        ));
        let events = Arc::new(EventBus::new(1024));
        let ledger = Arc::new(MovementLedger::new(
            Arc::clone(&graph),
            Arc::clone(&access),
            Arc::clone(&events),
        ));
        let registry = Arc::new(RecommendationService::new(
            Arc::clone(&ledger),
            Arc::clone(&events),
        ));
        Self {
            graph,
            access,
            events,
            ledger,
            registry,
            engine_config,
        }
    }

    /// Register a location
    pub fn add(&self, location: NewLocation) -> LocationId {
        self.graph
            .add_location(location)
            .expect("Failed to add location")
            .id
    }

    /// Register a document at `location` with `accesses` events spread over
    /// the 29 days before `now`
    pub fn document(&self, location: LocationId, accesses: i64, now: DateTime<Utc>) -> DocumentId {
        let id = DocumentId::new();
        self.access
            .register_document(id, location, now - Duration::days(365))
            .expect("Failed to register document");
        let user = UserId::new();
        let span = Duration::days(29).num_minutes();
        for i in (0..accesses).rev() {
            let at = now - Duration::minutes(span * i / accesses.max(1));
            self.access
                .record_access(id, AccessEvent::new(at, user, 120))
                .expect("Failed to record access");
        }
        id
    }

    /// Scan runner over this facility's stores
    pub fn runner(&self, scan: ScanConfig) -> ScanRunner {
        ScanRunner::new(
            self.graph.clone(),
            self.access.clone(),
            Arc::clone(&self.registry),
            self.engine_config.clone(),
            scan,
        )
    }

    /// Current occupancy of a location
    pub fn occupancy(&self, id: LocationId) -> u32 {
        self.graph
            .get_location(id)
            .expect("Location missing")
            .current_occupancy
    }
}

/// Operator acting in tests
pub fn operator() -> OperatorContext {
    OperatorContext::new(UserId::new(), "test-operator")
}

/// Shelf with uniform environmental and security scores
pub fn shelf(name: &str, distance: f64, capacity: u32, occupancy: u32, cost: f64) -> NewLocation {
    NewLocation::new(name, distance, capacity)
        .occupied(occupancy)
        .costing(cost)
        .scored(80.0, 80.0)
}

/// Frequently used document at a far, crowded shelf with a near shelf free
pub struct FrequentScenario {
    pub facility: TestFacility,
    pub document: DocumentId,
    pub shelf_a: LocationId,
    pub shelf_b: LocationId,
}

/// doc-001: 90 accesses a month at A (15 m, 8/10); B is 2 m away at 3/10
pub fn frequent_scenario(now: DateTime<Utc>) -> FrequentScenario {
    let facility = TestFacility::new();
    let shelf_a = facility.add(shelf("Shelf A", 15.0, 10, 8, 4.0));
    let shelf_b = facility.add(shelf("Shelf B", 2.0, 10, 3, 4.0));
    let document = facility.document(shelf_a, 90, now);
    FrequentScenario {
        facility,
        document,
        shelf_a,
        shelf_b,
    }
}

/// Rarely used document at a prime shelf with a cheap archive available
pub struct RareScenario {
    pub facility: TestFacility,
    pub document: DocumentId,
    pub shelf_a: LocationId,
    pub archive: LocationId,
}

/// doc-002: 4 accesses a month at A (15 m); archive C is 120 m away and cheaper
pub fn rare_scenario(now: DateTime<Utc>) -> RareScenario {
    let facility = TestFacility::new();
    let shelf_a = facility.add(shelf("Shelf A", 15.0, 10, 8, 10.0));
    let archive = facility.add(shelf("Archive C", 120.0, 200, 20, 2.0));
    let document = facility.document(shelf_a, 4, now);
    RareScenario {
        facility,
        document,
        shelf_a,
        archive,
    }
}
