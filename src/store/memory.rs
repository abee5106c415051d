//! In-memory [`FleetStore`] used by tests and by local runs without
//! `FLEET_DATABASE_URL`.
//!
//! Operations can be made to fail on demand with [`MemoryStore::fail_on`],
//! which is how the abort-on-persistence-error paths are exercised.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use fleet_types::{
    Driver, InsurancePolicy, Location, SemiTrailer, Stage, StageLocation, Trip, TripStatus,
    Vehicle,
};

use super::FleetStore;
use crate::error::{StoreError, StoreResult};
use crate::filters::{
    AssetFilter, DriverFilter, ExpiryWindow, LocationFilter, PolicyFilter, TripFilter,
};

#[derive(Default)]
struct MemoryState {
    drivers: HashMap<Uuid, Driver>,
    vehicles: HashMap<Uuid, Vehicle>,
    semi_trailers: HashMap<Uuid, SemiTrailer>,
    policies: HashMap<Uuid, InsurancePolicy>,
    locations: HashMap<Uuid, Location>,
    trips: HashMap<Uuid, Trip>,
    stages: HashMap<Uuid, Stage>,
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<RwLock<MemoryState>>,
    faults: Arc<Mutex<HashSet<&'static str>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every later call of the named operation (e.g. `"insert_stages"`)
    /// fail with [`StoreError::Unavailable`] until [`Self::clear_failures`].
    pub fn fail_on(&self, operation: &'static str) {
        if let Ok(mut faults) = self.faults.lock() {
            faults.insert(operation);
        }
    }

    pub fn clear_failures(&self) {
        if let Ok(mut faults) = self.faults.lock() {
            faults.clear();
        }
    }

    fn check(&self, operation: &'static str) -> StoreResult<()> {
        let failing = self
            .faults
            .lock()
            .map(|f| f.contains(operation))
            .unwrap_or(false);
        if failing {
            Err(StoreError::Unavailable(format!(
                "injected failure on {}",
                operation
            )))
        } else {
            Ok(())
        }
    }
}

fn sorted_by<T, K: Ord>(mut rows: Vec<T>, key: impl Fn(&T) -> K) -> Vec<T> {
    rows.sort_by_key(|r| key(r));
    rows
}

#[async_trait]
impl FleetStore for MemoryStore {
    // ── Drivers ──

    async fn save_driver(&self, driver: &Driver) -> StoreResult<()> {
        self.check("save_driver")?;
        let mut state = self.state.write().await;
        state.drivers.insert(driver.id, driver.clone());
        Ok(())
    }

    async fn load_driver(&self, id: Uuid) -> StoreResult<Option<Driver>> {
        self.check("load_driver")?;
        Ok(self.state.read().await.drivers.get(&id).cloned())
    }

    async fn list_drivers(
        &self,
        filter: &DriverFilter,
        window: ExpiryWindow,
    ) -> StoreResult<Vec<Driver>> {
        self.check("list_drivers")?;
        let state = self.state.read().await;
        let rows: Vec<Driver> = state
            .drivers
            .values()
            .filter(|d| filter.matches(d, window))
            .cloned()
            .collect();
        Ok(sorted_by(rows, |d| d.full_name.clone()))
    }

    async fn delete_driver(&self, id: Uuid) -> StoreResult<bool> {
        self.check("delete_driver")?;
        let mut state = self.state.write().await;
        let existed = state.drivers.remove(&id).is_some();
        for trip in state.trips.values_mut() {
            if trip.driver_id == Some(id) {
                trip.driver_id = None;
            }
        }
        Ok(existed)
    }

    // ── Vehicles ──

    async fn save_vehicle(&self, vehicle: &Vehicle) -> StoreResult<()> {
        self.check("save_vehicle")?;
        let mut state = self.state.write().await;
        state.vehicles.insert(vehicle.id, vehicle.clone());
        Ok(())
    }

    async fn load_vehicle(&self, id: Uuid) -> StoreResult<Option<Vehicle>> {
        self.check("load_vehicle")?;
        Ok(self.state.read().await.vehicles.get(&id).cloned())
    }

    async fn list_vehicles(
        &self,
        filter: &AssetFilter,
        window: ExpiryWindow,
    ) -> StoreResult<Vec<Vehicle>> {
        self.check("list_vehicles")?;
        let state = self.state.read().await;
        let rows: Vec<Vehicle> = state
            .vehicles
            .values()
            .filter(|v| filter.matches_vehicle(v, window))
            .cloned()
            .collect();
        Ok(sorted_by(rows, |v| v.plate.clone()))
    }

    async fn delete_vehicle(&self, id: Uuid) -> StoreResult<bool> {
        self.check("delete_vehicle")?;
        let mut state = self.state.write().await;
        let existed = state.vehicles.remove(&id).is_some();
        for trip in state.trips.values_mut() {
            if trip.vehicle_id == Some(id) {
                trip.vehicle_id = None;
            }
        }
        Ok(existed)
    }

    // ── Semi-trailers ──

    async fn save_semi_trailer(&self, trailer: &SemiTrailer) -> StoreResult<()> {
        self.check("save_semi_trailer")?;
        let mut state = self.state.write().await;
        state.semi_trailers.insert(trailer.id, trailer.clone());
        Ok(())
    }

    async fn load_semi_trailer(&self, id: Uuid) -> StoreResult<Option<SemiTrailer>> {
        self.check("load_semi_trailer")?;
        Ok(self.state.read().await.semi_trailers.get(&id).cloned())
    }

    async fn list_semi_trailers(
        &self,
        filter: &AssetFilter,
        window: ExpiryWindow,
    ) -> StoreResult<Vec<SemiTrailer>> {
        self.check("list_semi_trailers")?;
        let state = self.state.read().await;
        let rows: Vec<SemiTrailer> = state
            .semi_trailers
            .values()
            .filter(|t| filter.matches_semi_trailer(t, window))
            .cloned()
            .collect();
        Ok(sorted_by(rows, |t| t.plate.clone()))
    }

    async fn delete_semi_trailer(&self, id: Uuid) -> StoreResult<bool> {
        self.check("delete_semi_trailer")?;
        let mut state = self.state.write().await;
        let existed = state.semi_trailers.remove(&id).is_some();
        for trip in state.trips.values_mut() {
            if trip.semi_trailer_id == Some(id) {
                trip.semi_trailer_id = None;
            }
        }
        Ok(existed)
    }

    // ── Insurance policies ──

    async fn save_policy(&self, policy: &InsurancePolicy) -> StoreResult<()> {
        self.check("save_policy")?;
        let mut state = self.state.write().await;
        state.policies.insert(policy.id, policy.clone());
        Ok(())
    }

    async fn load_policy(&self, id: Uuid) -> StoreResult<Option<InsurancePolicy>> {
        self.check("load_policy")?;
        Ok(self.state.read().await.policies.get(&id).cloned())
    }

    async fn list_policies(
        &self,
        filter: &PolicyFilter,
        window: ExpiryWindow,
    ) -> StoreResult<Vec<InsurancePolicy>> {
        self.check("list_policies")?;
        let state = self.state.read().await;
        let rows: Vec<InsurancePolicy> = state
            .policies
            .values()
            .filter(|p| filter.matches(p, window))
            .cloned()
            .collect();
        Ok(sorted_by(rows, |p| {
            (p.end_date, p.policy_number.clone())
        }))
    }

    async fn delete_policy(&self, id: Uuid) -> StoreResult<bool> {
        self.check("delete_policy")?;
        Ok(self.state.write().await.policies.remove(&id).is_some())
    }

    // ── Locations ──

    async fn save_location(&self, location: &Location) -> StoreResult<()> {
        self.check("save_location")?;
        let mut state = self.state.write().await;
        state.locations.insert(location.id, location.clone());
        Ok(())
    }

    async fn load_location(&self, id: Uuid) -> StoreResult<Option<Location>> {
        self.check("load_location")?;
        Ok(self.state.read().await.locations.get(&id).cloned())
    }

    async fn list_locations(&self, filter: &LocationFilter) -> StoreResult<Vec<Location>> {
        self.check("list_locations")?;
        let state = self.state.read().await;
        let rows: Vec<Location> = state
            .locations
            .values()
            .filter(|l| filter.matches(l))
            .cloned()
            .collect();
        Ok(sorted_by(rows, |l| l.name.clone()))
    }

    async fn delete_location(&self, id: Uuid) -> StoreResult<bool> {
        self.check("delete_location")?;
        let mut state = self.state.write().await;
        let in_trip = state
            .trips
            .values()
            .any(|t| t.origin_location_id == id || t.destination_location_id == id);
        let in_stage = state.stages.values().any(|s| {
            s.location
                .as_ref()
                .and_then(StageLocation::location_id)
                .is_some_and(|l| l == id)
        });
        if in_trip || in_stage {
            return Err(StoreError::Conflict(format!(
                "location {} is still referenced",
                id
            )));
        }
        Ok(state.locations.remove(&id).is_some())
    }

    // ── Trips ──

    async fn save_trip(&self, trip: &Trip) -> StoreResult<()> {
        self.check("save_trip")?;
        let mut state = self.state.write().await;
        state.trips.insert(trip.id, trip.clone());
        Ok(())
    }

    async fn load_trip(&self, id: Uuid) -> StoreResult<Option<Trip>> {
        self.check("load_trip")?;
        Ok(self.state.read().await.trips.get(&id).cloned())
    }

    async fn list_trips(&self, filter: &TripFilter) -> StoreResult<Vec<Trip>> {
        self.check("list_trips")?;
        let state = self.state.read().await;
        let rows: Vec<Trip> = state
            .trips
            .values()
            .filter(|t| filter.matches(t))
            .cloned()
            .collect();
        // Newest first
        Ok(sorted_by(rows, |t| std::cmp::Reverse(t.created_at)))
    }

    async fn update_trip_status(&self, id: Uuid, status: TripStatus) -> StoreResult<()> {
        self.check("update_trip_status")?;
        let mut state = self.state.write().await;
        if let Some(trip) = state.trips.get_mut(&id) {
            trip.status = status;
            trip.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn delete_trip(&self, id: Uuid) -> StoreResult<bool> {
        self.check("delete_trip")?;
        let mut state = self.state.write().await;
        state.stages.retain(|_, s| s.trip_id != id);
        Ok(state.trips.remove(&id).is_some())
    }

    // ── Stages ──

    async fn insert_stages(&self, stages: &[Stage]) -> StoreResult<()> {
        self.check("insert_stages")?;
        let mut state = self.state.write().await;
        if let Some(dup) = stages.iter().find(|s| state.stages.contains_key(&s.id)) {
            return Err(StoreError::Conflict(format!("stage {} already exists", dup.id)));
        }
        for stage in stages {
            state.stages.insert(stage.id, stage.clone());
        }
        Ok(())
    }

    async fn load_stages(&self, trip_id: Uuid) -> StoreResult<Vec<Stage>> {
        self.check("load_stages")?;
        let state = self.state.read().await;
        let rows: Vec<Stage> = state
            .stages
            .values()
            .filter(|s| s.trip_id == trip_id)
            .cloned()
            .collect();
        Ok(sorted_by(rows, |s| (s.position, s.scheduled_at)))
    }

    async fn load_stage(&self, id: Uuid) -> StoreResult<Option<Stage>> {
        self.check("load_stage")?;
        Ok(self.state.read().await.stages.get(&id).cloned())
    }

    async fn update_stage_completion(
        &self,
        id: Uuid,
        completed: bool,
        completed_at: Option<DateTime<Utc>>,
    ) -> StoreResult<()> {
        self.check("update_stage_completion")?;
        let mut state = self.state.write().await;
        if let Some(stage) = state.stages.get_mut(&id) {
            stage.completed = completed;
            stage.completed_at = completed_at;
        }
        Ok(())
    }

    async fn update_stage_location(
        &self,
        id: Uuid,
        location: Option<&StageLocation>,
    ) -> StoreResult<()> {
        self.check("update_stage_location")?;
        let mut state = self.state.write().await;
        if let Some(stage) = state.stages.get_mut(&id) {
            stage.location = location.cloned();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fleet_types::{LocationCategory, LocationInput, TripDirection, TripInput};

    fn location(name: &str) -> Location {
        Location::from_input(LocationInput {
            name: name.into(),
            category: LocationCategory::Port,
            address: None,
            city: "Valencia".into(),
            country: "Spain".into(),
        })
    }

    fn trip(origin: Uuid, destination: Uuid) -> Trip {
        Trip::from_input(TripInput {
            reference: "EXP-1".into(),
            direction: TripDirection::Outbound,
            origin_location_id: origin,
            destination_location_id: destination,
            driver_id: None,
            vehicle_id: None,
            semi_trailer_id: None,
            container_number: None,
            scheduled_departure: None,
            notes: None,
        })
    }

    #[tokio::test]
    async fn test_referenced_location_cannot_be_deleted() {
        let store = MemoryStore::new();
        let port = location("Port");
        let client = location("Client");
        store.save_location(&port).await.unwrap();
        store.save_location(&client).await.unwrap();
        store.save_trip(&trip(port.id, client.id)).await.unwrap();

        let result = store.delete_location(port.id).await;
        assert!(matches!(result, Err(StoreError::Conflict(_))));
        assert!(store.load_location(port.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_delete_trip_removes_stages() {
        let store = MemoryStore::new();
        let t = trip(Uuid::new_v4(), Uuid::new_v4());
        store.save_trip(&t).await.unwrap();
        let now = Utc::now();
        store
            .insert_stages(&[
                Stage::pending(t.id, "a", 0, None, now),
                Stage::pending(t.id, "b", 1, None, now),
            ])
            .await
            .unwrap();

        assert!(store.delete_trip(t.id).await.unwrap());
        assert!(store.load_stages(t.id).await.unwrap().is_empty());
        assert!(!store.delete_trip(t.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_injected_failure_keeps_state() {
        let store = MemoryStore::new();
        let t = trip(Uuid::new_v4(), Uuid::new_v4());
        store.fail_on("insert_stages");

        let result = store
            .insert_stages(&[Stage::pending(t.id, "a", 0, None, Utc::now())])
            .await;
        assert!(matches!(result, Err(StoreError::Unavailable(_))));
        assert!(store.load_stages(t.id).await.unwrap().is_empty());

        store.clear_failures();
        store
            .insert_stages(&[Stage::pending(t.id, "a", 0, None, Utc::now())])
            .await
            .unwrap();
        assert_eq!(store.load_stages(t.id).await.unwrap().len(), 1);
    }
}
