//! Return-trip workflow through the public service and engine API, using the
//! built-in stage catalog over an in-memory store.

use std::sync::Arc;

use fleet_admin::{FleetError, FleetService, MemoryStore, StageCatalog, StageEngine};
use fleet_types::{
    EmbeddedLocation, LocationCategory, LocationInput, StageLocation, TripDirection, TripInput,
    TripStatus,
};

struct Harness {
    fleet: FleetService,
    engine: StageEngine,
}

fn harness() -> Harness {
    let store = Arc::new(MemoryStore::new());
    let catalog = Arc::new(StageCatalog::builtin().unwrap());
    Harness {
        fleet: FleetService::new(store.clone(), 30),
        engine: StageEngine::new(store, catalog),
    }
}

async fn location(fleet: &FleetService, name: &str, category: LocationCategory) -> uuid::Uuid {
    fleet
        .create_location(LocationInput {
            name: name.into(),
            category,
            address: None,
            city: "Valencia".into(),
            country: "Spain".into(),
        })
        .await
        .unwrap()
        .id
}

fn return_trip(origin: uuid::Uuid, destination: uuid::Uuid) -> TripInput {
    TripInput {
        reference: "IMP-2025-0042".into(),
        direction: TripDirection::Return,
        origin_location_id: origin,
        destination_location_id: destination,
        driver_id: None,
        vehicle_id: None,
        semi_trailer_id: None,
        container_number: None,
        scheduled_departure: None,
        notes: None,
    }
}

#[tokio::test]
async fn return_trip_runs_to_completion() {
    let h = harness();
    let client = location(&h.fleet, "Client yard", LocationCategory::Client).await;
    let customs = location(&h.fleet, "Valencia customs", LocationCategory::Customs).await;
    let trip = h.fleet.create_trip(return_trip(client, customs)).await.unwrap();

    let stages = h.engine.initialize_stages(trip.id).await.unwrap();
    let tags: Vec<&str> = stages.iter().map(|s| s.stage_type.as_str()).collect();
    assert_eq!(
        tags,
        ["client_pickup", "customs_clearance", "empty_container_return"]
    );
    assert_eq!(stages[0].location, Some(StageLocation::referenced(client)));
    match &stages[2].location {
        Some(StageLocation::Embedded(loc)) => assert_eq!(loc.city, "Valencia"),
        other => panic!("expected embedded depot, got {other:?}"),
    }

    // pick another depot from the menu
    let sagunto = EmbeddedLocation {
        name: "Depósito Vacíos Sagunto".into(),
        city: "Sagunto".into(),
        country: "Spain".into(),
    };
    let depot = h
        .engine
        .reassign_location(stages[2].id, Some(StageLocation::Embedded(sagunto.clone())))
        .await
        .unwrap();
    assert_eq!(depot.location, Some(StageLocation::Embedded(sagunto)));

    // return trips never move to en route on their first stage
    let outcome = h.engine.toggle_stage(stages[0].id, true).await.unwrap();
    assert!(!outcome.status_changed);
    assert_eq!(outcome.trip.status, TripStatus::Planned);

    h.engine.toggle_stage(stages[1].id, true).await.unwrap();
    let outcome = h.engine.toggle_stage(stages[2].id, true).await.unwrap();
    assert!(outcome.status_changed);
    assert_eq!(outcome.trip.status, TripStatus::Completed);
}

#[tokio::test]
async fn depot_outside_menu_is_rejected() {
    let h = harness();
    let client = location(&h.fleet, "Client yard", LocationCategory::Client).await;
    let customs = location(&h.fleet, "Valencia customs", LocationCategory::Customs).await;
    let trip = h.fleet.create_trip(return_trip(client, customs)).await.unwrap();
    let stages = h.engine.initialize_stages(trip.id).await.unwrap();

    let elsewhere = StageLocation::Embedded(EmbeddedLocation {
        name: "Somewhere else".into(),
        city: "Madrid".into(),
        country: "Spain".into(),
    });
    let err = h
        .engine
        .reassign_location(stages[2].id, Some(elsewhere))
        .await
        .unwrap_err();
    assert!(matches!(err, FleetError::Validation(_)));

    let err = h
        .engine
        .reassign_location(stages[2].id, Some(StageLocation::referenced(client)))
        .await
        .unwrap_err();
    assert!(matches!(err, FleetError::Validation(_)));
}

#[tokio::test]
async fn incident_resolution_restores_stage_status() {
    let h = harness();
    let client = location(&h.fleet, "Client yard", LocationCategory::Client).await;
    let customs = location(&h.fleet, "Valencia customs", LocationCategory::Customs).await;
    let trip = h.fleet.create_trip(return_trip(client, customs)).await.unwrap();
    h.engine.initialize_stages(trip.id).await.unwrap();

    let flagged = h
        .engine
        .report_incident(trip.id, Some("flat tyre".into()))
        .await
        .unwrap();
    assert_eq!(flagged.status, TripStatus::Incident);

    let resolved = h
        .engine
        .resolve_incident(trip.id, Some("tyre replaced".into()))
        .await
        .unwrap();
    assert_eq!(resolved.status, TripStatus::Planned);
    let notes = resolved.notes.unwrap_or_default();
    assert!(notes.contains("Incident: flat tyre"));
    assert!(notes.contains("Resolved: tyre replaced"));

    let err = h.engine.resolve_incident(trip.id, None).await.unwrap_err();
    assert!(matches!(err, FleetError::InvalidOperation(_)));
}
