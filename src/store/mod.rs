//! Persistence port for all fleet records.
//!
//! The workflow engine and the HTTP layer operate exclusively through
//! [`FleetStore`], so the backend can run against Postgres in production and
//! against [`MemoryStore`] in tests or local runs without a database.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use fleet_types::{
    Driver, InsurancePolicy, Location, SemiTrailer, Stage, StageLocation, Trip, TripStatus,
    Vehicle,
};

use crate::error::StoreResult;
use crate::filters::{
    AssetFilter, DriverFilter, ExpiryWindow, LocationFilter, PolicyFilter, TripFilter,
};

pub mod memory;
#[cfg(feature = "database")]
pub mod postgres;

pub use memory::MemoryStore;
#[cfg(feature = "database")]
pub use postgres::PgFleetStore;

/// Persistence trait for fleet master data, trips and trip stages.
///
/// `save_*` methods insert or replace a whole record. `delete_*` methods
/// return whether a row existed. Listings are returned in display order.
#[async_trait]
pub trait FleetStore: Send + Sync {
    // ── Drivers ──

    async fn save_driver(&self, driver: &Driver) -> StoreResult<()>;
    async fn load_driver(&self, id: Uuid) -> StoreResult<Option<Driver>>;
    async fn list_drivers(
        &self,
        filter: &DriverFilter,
        window: ExpiryWindow,
    ) -> StoreResult<Vec<Driver>>;
    async fn delete_driver(&self, id: Uuid) -> StoreResult<bool>;

    // ── Vehicles ──

    async fn save_vehicle(&self, vehicle: &Vehicle) -> StoreResult<()>;
    async fn load_vehicle(&self, id: Uuid) -> StoreResult<Option<Vehicle>>;
    async fn list_vehicles(
        &self,
        filter: &AssetFilter,
        window: ExpiryWindow,
    ) -> StoreResult<Vec<Vehicle>>;
    async fn delete_vehicle(&self, id: Uuid) -> StoreResult<bool>;

    // ── Semi-trailers ──

    async fn save_semi_trailer(&self, trailer: &SemiTrailer) -> StoreResult<()>;
    async fn load_semi_trailer(&self, id: Uuid) -> StoreResult<Option<SemiTrailer>>;
    async fn list_semi_trailers(
        &self,
        filter: &AssetFilter,
        window: ExpiryWindow,
    ) -> StoreResult<Vec<SemiTrailer>>;
    async fn delete_semi_trailer(&self, id: Uuid) -> StoreResult<bool>;

    // ── Insurance policies ──

    async fn save_policy(&self, policy: &InsurancePolicy) -> StoreResult<()>;
    async fn load_policy(&self, id: Uuid) -> StoreResult<Option<InsurancePolicy>>;
    async fn list_policies(
        &self,
        filter: &PolicyFilter,
        window: ExpiryWindow,
    ) -> StoreResult<Vec<InsurancePolicy>>;
    async fn delete_policy(&self, id: Uuid) -> StoreResult<bool>;

    // ── Locations ──

    async fn save_location(&self, location: &Location) -> StoreResult<()>;
    async fn load_location(&self, id: Uuid) -> StoreResult<Option<Location>>;
    async fn list_locations(&self, filter: &LocationFilter) -> StoreResult<Vec<Location>>;
    /// Fails with [`crate::error::StoreError::Conflict`] while a trip or stage refers to it
    async fn delete_location(&self, id: Uuid) -> StoreResult<bool>;

    // ── Trips ──

    async fn save_trip(&self, trip: &Trip) -> StoreResult<()>;
    async fn load_trip(&self, id: Uuid) -> StoreResult<Option<Trip>>;
    async fn list_trips(&self, filter: &TripFilter) -> StoreResult<Vec<Trip>>;
    async fn update_trip_status(&self, id: Uuid, status: TripStatus) -> StoreResult<()>;
    /// Deletes the trip and its stages
    async fn delete_trip(&self, id: Uuid) -> StoreResult<bool>;

    // ── Stages ──

    /// Insert a whole stage set. All-or-nothing: on error no stage is kept.
    async fn insert_stages(&self, stages: &[Stage]) -> StoreResult<()>;
    /// Stages of a trip ordered by position
    async fn load_stages(&self, trip_id: Uuid) -> StoreResult<Vec<Stage>>;
    async fn load_stage(&self, id: Uuid) -> StoreResult<Option<Stage>>;
    async fn update_stage_completion(
        &self,
        id: Uuid,
        completed: bool,
        completed_at: Option<DateTime<Utc>>,
    ) -> StoreResult<()>;
    async fn update_stage_location(
        &self,
        id: Uuid,
        location: Option<&StageLocation>,
    ) -> StoreResult<()>;
}
