//! Fleet master-data service
//!
//! CRUD over drivers, vehicles, semi-trailers, insurance policies,
//! locations and trips. Inputs are validated in full before anything is
//! written; listings carry their expiry badges.

use chrono::{NaiveDate, Utc};
use std::sync::Arc;
use tracing::{debug, error, info};
use uuid::Uuid;

use fleet_types::{
    AssetStatus, DashboardSummary, Driver, DriverInput, ExpiryAlert, ExpiryStatus,
    InsurancePolicy, InsurancePolicyInput, InsuredAsset, Location, LocationInput, PolicyStatus,
    SemiTrailer, SemiTrailerInput, Trip, TripInput, TripStatus, TripStatusCounts, Vehicle,
    VehicleInput, WithBadge,
};

use crate::error::{FleetError, FleetResult, StoreError, ValidationErrors};
use crate::filters::{
    AssetFilter, DriverFilter, ExpiryWindow, LocationFilter, PolicyFilter, TripFilter,
};
use crate::rules::{expiry_status, license_status, policy_status};
use crate::store::FleetStore;
use crate::validation::{
    validate_driver, validate_insurance_policy, validate_location, validate_semi_trailer,
    validate_trip, validate_vehicle, Validator,
};

pub type DriverView = WithBadge<Driver, ExpiryStatus>;
/// Vehicles and semi-trailers without an inspection date carry no badge
pub type VehicleView = WithBadge<Vehicle, Option<ExpiryStatus>>;
pub type SemiTrailerView = WithBadge<SemiTrailer, Option<ExpiryStatus>>;
pub type PolicyView = WithBadge<InsurancePolicy, PolicyStatus>;

#[derive(Clone)]
pub struct FleetService {
    store: Arc<dyn FleetStore>,
    warning_days: i64,
}

impl FleetService {
    pub fn new(store: Arc<dyn FleetStore>, warning_days: i64) -> Self {
        Self {
            store,
            warning_days,
        }
    }

    pub fn store(&self) -> &Arc<dyn FleetStore> {
        &self.store
    }

    fn today(&self) -> NaiveDate {
        Utc::now().date_naive()
    }

    fn window(&self) -> ExpiryWindow {
        ExpiryWindow::new(self.today(), self.warning_days)
    }

    fn driver_view(&self, driver: Driver) -> DriverView {
        let badge = license_status(&driver, self.today(), self.warning_days);
        WithBadge {
            record: driver,
            badge,
        }
    }

    fn vehicle_view(&self, vehicle: Vehicle) -> VehicleView {
        let badge = vehicle
            .inspection_expiry
            .map(|d| expiry_status(d, self.today(), self.warning_days));
        WithBadge {
            record: vehicle,
            badge,
        }
    }

    fn semi_trailer_view(&self, trailer: SemiTrailer) -> SemiTrailerView {
        let badge = trailer
            .inspection_expiry
            .map(|d| expiry_status(d, self.today(), self.warning_days));
        WithBadge {
            record: trailer,
            badge,
        }
    }

    fn policy_view(&self, policy: InsurancePolicy) -> PolicyView {
        let badge = policy_status(&policy, self.today(), self.warning_days);
        WithBadge {
            record: policy,
            badge,
        }
    }

    // =========================================================================
    // DRIVERS
    // =========================================================================

    pub async fn list_drivers(&self, filter: &DriverFilter) -> FleetResult<Vec<DriverView>> {
        let drivers = self
            .store
            .list_drivers(filter, self.window())
            .await
            .map_err(log_store_error)?;
        debug!(count = drivers.len(), "Listed drivers");
        Ok(drivers.into_iter().map(|d| self.driver_view(d)).collect())
    }

    pub async fn get_driver(&self, id: Uuid) -> FleetResult<DriverView> {
        let driver = self.require_driver(id).await?;
        Ok(self.driver_view(driver))
    }

    async fn require_driver(&self, id: Uuid) -> FleetResult<Driver> {
        self.store
            .load_driver(id)
            .await
            .map_err(log_store_error)?
            .ok_or_else(|| FleetError::not_found("driver", id))
    }

    pub async fn create_driver(&self, input: DriverInput) -> FleetResult<DriverView> {
        validate_driver(&input)?;
        let driver = Driver::from_input(input);
        self.store
            .save_driver(&driver)
            .await
            .map_err(log_store_error)?;
        info!(driver_id = %driver.id, name = %driver.full_name, "Created driver");
        Ok(self.driver_view(driver))
    }

    pub async fn update_driver(&self, id: Uuid, input: DriverInput) -> FleetResult<DriverView> {
        validate_driver(&input)?;
        let mut driver = self.require_driver(id).await?;
        driver.apply_input(input);
        self.store
            .save_driver(&driver)
            .await
            .map_err(log_store_error)?;
        info!(driver_id = %id, "Updated driver");
        Ok(self.driver_view(driver))
    }

    pub async fn delete_driver(&self, id: Uuid) -> FleetResult<()> {
        let deleted = self
            .store
            .delete_driver(id)
            .await
            .map_err(log_store_error)?;
        deleted_or_not_found(deleted, "driver", id)
    }

    // =========================================================================
    // VEHICLES
    // =========================================================================

    pub async fn list_vehicles(&self, filter: &AssetFilter) -> FleetResult<Vec<VehicleView>> {
        let vehicles = self
            .store
            .list_vehicles(filter, self.window())
            .await
            .map_err(log_store_error)?;
        Ok(vehicles.into_iter().map(|v| self.vehicle_view(v)).collect())
    }

    pub async fn get_vehicle(&self, id: Uuid) -> FleetResult<VehicleView> {
        let vehicle = self.require_vehicle(id).await?;
        Ok(self.vehicle_view(vehicle))
    }

    async fn require_vehicle(&self, id: Uuid) -> FleetResult<Vehicle> {
        self.store
            .load_vehicle(id)
            .await
            .map_err(log_store_error)?
            .ok_or_else(|| FleetError::not_found("vehicle", id))
    }

    pub async fn create_vehicle(&self, input: VehicleInput) -> FleetResult<VehicleView> {
        validate_vehicle(&input)?;
        let vehicle = Vehicle::from_input(input);
        self.store
            .save_vehicle(&vehicle)
            .await
            .map_err(log_store_error)?;
        info!(vehicle_id = %vehicle.id, plate = %vehicle.plate, "Created vehicle");
        Ok(self.vehicle_view(vehicle))
    }

    pub async fn update_vehicle(&self, id: Uuid, input: VehicleInput) -> FleetResult<VehicleView> {
        validate_vehicle(&input)?;
        let mut vehicle = self.require_vehicle(id).await?;
        vehicle.apply_input(input);
        self.store
            .save_vehicle(&vehicle)
            .await
            .map_err(log_store_error)?;
        info!(vehicle_id = %id, "Updated vehicle");
        Ok(self.vehicle_view(vehicle))
    }

    pub async fn delete_vehicle(&self, id: Uuid) -> FleetResult<()> {
        let deleted = self
            .store
            .delete_vehicle(id)
            .await
            .map_err(log_store_error)?;
        deleted_or_not_found(deleted, "vehicle", id)
    }

    // =========================================================================
    // SEMI-TRAILERS
    // =========================================================================

    pub async fn list_semi_trailers(
        &self,
        filter: &AssetFilter,
    ) -> FleetResult<Vec<SemiTrailerView>> {
        let trailers = self
            .store
            .list_semi_trailers(filter, self.window())
            .await
            .map_err(log_store_error)?;
        Ok(trailers
            .into_iter()
            .map(|t| self.semi_trailer_view(t))
            .collect())
    }

    pub async fn get_semi_trailer(&self, id: Uuid) -> FleetResult<SemiTrailerView> {
        let trailer = self.require_semi_trailer(id).await?;
        Ok(self.semi_trailer_view(trailer))
    }

    async fn require_semi_trailer(&self, id: Uuid) -> FleetResult<SemiTrailer> {
        self.store
            .load_semi_trailer(id)
            .await
            .map_err(log_store_error)?
            .ok_or_else(|| FleetError::not_found("semi-trailer", id))
    }

    pub async fn create_semi_trailer(
        &self,
        input: SemiTrailerInput,
    ) -> FleetResult<SemiTrailerView> {
        validate_semi_trailer(&input)?;
        let trailer = SemiTrailer::from_input(input);
        self.store
            .save_semi_trailer(&trailer)
            .await
            .map_err(log_store_error)?;
        info!(semi_trailer_id = %trailer.id, plate = %trailer.plate, "Created semi-trailer");
        Ok(self.semi_trailer_view(trailer))
    }

    pub async fn update_semi_trailer(
        &self,
        id: Uuid,
        input: SemiTrailerInput,
    ) -> FleetResult<SemiTrailerView> {
        validate_semi_trailer(&input)?;
        let mut trailer = self.require_semi_trailer(id).await?;
        trailer.apply_input(input);
        self.store
            .save_semi_trailer(&trailer)
            .await
            .map_err(log_store_error)?;
        info!(semi_trailer_id = %id, "Updated semi-trailer");
        Ok(self.semi_trailer_view(trailer))
    }

    pub async fn delete_semi_trailer(&self, id: Uuid) -> FleetResult<()> {
        let deleted = self
            .store
            .delete_semi_trailer(id)
            .await
            .map_err(log_store_error)?;
        deleted_or_not_found(deleted, "semi-trailer", id)
    }

    // =========================================================================
    // INSURANCE POLICIES
    // =========================================================================

    pub async fn list_policies(&self, filter: &PolicyFilter) -> FleetResult<Vec<PolicyView>> {
        let policies = self
            .store
            .list_policies(filter, self.window())
            .await
            .map_err(log_store_error)?;
        Ok(policies.into_iter().map(|p| self.policy_view(p)).collect())
    }

    pub async fn get_policy(&self, id: Uuid) -> FleetResult<PolicyView> {
        let policy = self.require_policy(id).await?;
        Ok(self.policy_view(policy))
    }

    async fn require_policy(&self, id: Uuid) -> FleetResult<InsurancePolicy> {
        self.store
            .load_policy(id)
            .await
            .map_err(log_store_error)?
            .ok_or_else(|| FleetError::not_found("insurance policy", id))
    }

    /// Policy inputs must name an existing vehicle or semi-trailer
    async fn check_insured_asset(&self, input: &InsurancePolicyInput) -> FleetResult<()> {
        let exists = match input.asset {
            InsuredAsset::Vehicle { id } => self
                .store
                .load_vehicle(id)
                .await
                .map_err(log_store_error)?
                .is_some(),
            InsuredAsset::SemiTrailer { id } => self
                .store
                .load_semi_trailer(id)
                .await
                .map_err(log_store_error)?
                .is_some(),
        };
        if exists {
            Ok(())
        } else {
            Err(ValidationErrors::single(
                "asset",
                format!("{} {} does not exist", input.asset.kind(), input.asset.id()),
            )
            .into())
        }
    }

    pub async fn create_policy(&self, input: InsurancePolicyInput) -> FleetResult<PolicyView> {
        validate_insurance_policy(&input)?;
        self.check_insured_asset(&input).await?;
        let policy = InsurancePolicy::from_input(input);
        self.store
            .save_policy(&policy)
            .await
            .map_err(log_store_error)?;
        info!(policy_id = %policy.id, number = %policy.policy_number, "Created insurance policy");
        Ok(self.policy_view(policy))
    }

    pub async fn update_policy(
        &self,
        id: Uuid,
        input: InsurancePolicyInput,
    ) -> FleetResult<PolicyView> {
        validate_insurance_policy(&input)?;
        let mut policy = self.require_policy(id).await?;
        self.check_insured_asset(&input).await?;
        policy.apply_input(input);
        self.store
            .save_policy(&policy)
            .await
            .map_err(log_store_error)?;
        info!(policy_id = %id, "Updated insurance policy");
        Ok(self.policy_view(policy))
    }

    pub async fn delete_policy(&self, id: Uuid) -> FleetResult<()> {
        let deleted = self
            .store
            .delete_policy(id)
            .await
            .map_err(log_store_error)?;
        deleted_or_not_found(deleted, "insurance policy", id)
    }

    // =========================================================================
    // LOCATIONS
    // =========================================================================

    pub async fn list_locations(&self, filter: &LocationFilter) -> FleetResult<Vec<Location>> {
        Ok(self
            .store
            .list_locations(filter)
            .await
            .map_err(log_store_error)?)
    }

    pub async fn get_location(&self, id: Uuid) -> FleetResult<Location> {
        self.store
            .load_location(id)
            .await
            .map_err(log_store_error)?
            .ok_or_else(|| FleetError::not_found("location", id))
    }

    pub async fn create_location(&self, input: LocationInput) -> FleetResult<Location> {
        validate_location(&input)?;
        let location = Location::from_input(input);
        self.store
            .save_location(&location)
            .await
            .map_err(log_store_error)?;
        info!(location_id = %location.id, name = %location.name, "Created location");
        Ok(location)
    }

    pub async fn update_location(&self, id: Uuid, input: LocationInput) -> FleetResult<Location> {
        validate_location(&input)?;
        let mut location = self.get_location(id).await?;
        location.apply_input(input);
        self.store
            .save_location(&location)
            .await
            .map_err(log_store_error)?;
        info!(location_id = %id, "Updated location");
        Ok(location)
    }

    /// Fails with a store conflict while a trip or stage still refers to it
    pub async fn delete_location(&self, id: Uuid) -> FleetResult<()> {
        let deleted = self
            .store
            .delete_location(id)
            .await
            .map_err(log_store_error)?;
        deleted_or_not_found(deleted, "location", id)
    }

    // =========================================================================
    // TRIPS
    // =========================================================================

    pub async fn list_trips(&self, filter: &TripFilter) -> FleetResult<Vec<Trip>> {
        Ok(self
            .store
            .list_trips(filter)
            .await
            .map_err(log_store_error)?)
    }

    pub async fn get_trip(&self, id: Uuid) -> FleetResult<Trip> {
        self.store
            .load_trip(id)
            .await
            .map_err(log_store_error)?
            .ok_or_else(|| FleetError::not_found("trip", id))
    }

    /// Every record a trip input refers to must exist
    async fn check_trip_references(&self, input: &TripInput) -> FleetResult<()> {
        let store = &self.store;
        let mut v = Validator::new();

        let origin = store
            .load_location(input.origin_location_id)
            .await
            .map_err(log_store_error)?;
        v.check(origin.is_some(), "origin_location_id", "unknown location");

        let destination = store
            .load_location(input.destination_location_id)
            .await
            .map_err(log_store_error)?;
        v.check(
            destination.is_some(),
            "destination_location_id",
            "unknown location",
        );

        if let Some(id) = input.driver_id {
            let driver = store.load_driver(id).await.map_err(log_store_error)?;
            v.check(driver.is_some(), "driver_id", "unknown driver");
        }
        if let Some(id) = input.vehicle_id {
            let vehicle = store.load_vehicle(id).await.map_err(log_store_error)?;
            v.check(vehicle.is_some(), "vehicle_id", "unknown vehicle");
        }
        if let Some(id) = input.semi_trailer_id {
            let trailer = store.load_semi_trailer(id).await.map_err(log_store_error)?;
            v.check(trailer.is_some(), "semi_trailer_id", "unknown semi-trailer");
        }

        Ok(v.finish()?)
    }

    pub async fn create_trip(&self, input: TripInput) -> FleetResult<Trip> {
        let input = normalize_trip_input(input);
        validate_trip(&input)?;
        self.check_trip_references(&input).await?;
        let trip = Trip::from_input(input);
        self.store.save_trip(&trip).await.map_err(log_store_error)?;
        info!(
            trip_id = %trip.id,
            reference = %trip.reference,
            direction = %trip.direction,
            "Created trip"
        );
        Ok(trip)
    }

    /// Replace a trip's editable fields. The direction is fixed once stages
    /// exist, since they were drawn from that direction's catalog.
    pub async fn update_trip(&self, id: Uuid, input: TripInput) -> FleetResult<Trip> {
        let input = normalize_trip_input(input);
        validate_trip(&input)?;
        let mut trip = self.get_trip(id).await?;
        self.check_trip_references(&input).await?;

        if input.direction != trip.direction {
            let stages = self.store.load_stages(id).await.map_err(log_store_error)?;
            if !stages.is_empty() {
                return Err(ValidationErrors::single(
                    "direction",
                    "cannot change once stages exist",
                )
                .into());
            }
        }

        trip.apply_input(input);
        self.store.save_trip(&trip).await.map_err(log_store_error)?;
        info!(trip_id = %id, "Updated trip");
        Ok(trip)
    }

    /// Deletes the trip together with its stages
    pub async fn delete_trip(&self, id: Uuid) -> FleetResult<()> {
        let deleted = self.store.delete_trip(id).await.map_err(log_store_error)?;
        deleted_or_not_found(deleted, "trip", id)
    }

    // =========================================================================
    // DASHBOARD
    // =========================================================================

    pub async fn dashboard(&self) -> FleetResult<DashboardSummary> {
        let window = self.window();
        let store = &self.store;

        let trips = store
            .list_trips(&TripFilter::default())
            .await
            .map_err(log_store_error)?;
        let mut counts = TripStatusCounts::default();
        for trip in &trips {
            match trip.status {
                TripStatus::Planned => counts.planned += 1,
                TripStatus::EnRoute => counts.en_route += 1,
                TripStatus::Completed => counts.completed += 1,
                TripStatus::Incident => counts.incident += 1,
                TripStatus::Cancelled => counts.cancelled += 1,
            }
        }

        let drivers = store
            .list_drivers(&DriverFilter::default(), window)
            .await
            .map_err(log_store_error)?;
        let vehicles = store
            .list_vehicles(&AssetFilter::default(), window)
            .await
            .map_err(log_store_error)?;
        let trailers = store
            .list_semi_trailers(&AssetFilter::default(), window)
            .await
            .map_err(log_store_error)?;
        let policies = store
            .list_policies(&PolicyFilter::default(), window)
            .await
            .map_err(log_store_error)?;

        let mut alerts = Vec::new();
        let mut alert = |subject: &str, id: Uuid, label: &str, expires_on: NaiveDate| {
            let status = expiry_status(expires_on, window.today, window.warning_days);
            if status != ExpiryStatus::Valid {
                alerts.push(ExpiryAlert {
                    subject: subject.to_string(),
                    id,
                    label: label.to_string(),
                    expires_on,
                    status,
                });
            }
        };

        for d in drivers.iter().filter(|d| d.active) {
            alert("driver_license", d.id, &d.full_name, d.license_expiry);
        }
        for v in &vehicles {
            if let Some(date) = v.inspection_expiry {
                alert("vehicle_inspection", v.id, &v.plate, date);
            }
        }
        for t in &trailers {
            if let Some(date) = t.inspection_expiry {
                alert("semi_trailer_inspection", t.id, &t.plate, date);
            }
        }
        for p in policies.iter().filter(|p| p.start_date <= window.today) {
            alert("insurance_policy", p.id, &p.policy_number, p.end_date);
        }
        alerts.sort_by(|a, b| a.expires_on.cmp(&b.expires_on));

        Ok(DashboardSummary {
            trips: counts,
            active_drivers: drivers.iter().filter(|d| d.active).count(),
            available_vehicles: vehicles
                .iter()
                .filter(|v| v.status == AssetStatus::Available)
                .count(),
            available_semi_trailers: trailers
                .iter()
                .filter(|t| t.status == AssetStatus::Available)
                .count(),
            alerts,
        })
    }
}

/// Upper-case and trim the container number; drop it when blank
fn normalize_trip_input(mut input: TripInput) -> TripInput {
    input.container_number = input
        .container_number
        .map(|c| c.trim().to_uppercase())
        .filter(|c| !c.is_empty());
    input
}

fn deleted_or_not_found(deleted: bool, entity: &'static str, id: Uuid) -> FleetResult<()> {
    if deleted {
        info!(entity, id = %id, "Deleted record");
        Ok(())
    } else {
        Err(FleetError::not_found(entity, id))
    }
}

fn log_store_error(err: StoreError) -> StoreError {
    error!(error = %err, "Fleet store operation failed");
    err
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use chrono::Duration;
    use fleet_types::{Coverage, LocationCategory, TripDirection};
    use rust_decimal::Decimal;

    fn service() -> (MemoryStore, FleetService) {
        let store = MemoryStore::new();
        let service = FleetService::new(Arc::new(store.clone()), 30);
        (store, service)
    }

    fn driver_input(name: &str, expiry: NaiveDate) -> DriverInput {
        DriverInput {
            full_name: name.into(),
            national_id: format!("ID-{}", name.len()),
            license_number: "C-100200".into(),
            license_expiry: expiry,
            phone: None,
            email: Some("driver@example.com".into()),
            active: true,
        }
    }

    fn location_input(name: &str, category: LocationCategory) -> LocationInput {
        LocationInput {
            name: name.into(),
            category,
            address: None,
            city: "Valencia".into(),
            country: "Spain".into(),
        }
    }

    fn trip_input(origin: Uuid, destination: Uuid) -> TripInput {
        TripInput {
            reference: "EXP-2025-0042".into(),
            direction: TripDirection::Outbound,
            origin_location_id: origin,
            destination_location_id: destination,
            driver_id: None,
            vehicle_id: None,
            semi_trailer_id: None,
            container_number: Some(" mscu1234566 ".into()),
            scheduled_departure: None,
            notes: None,
        }
    }

    #[tokio::test]
    async fn test_driver_crud_with_badge() {
        let (_, service) = service();
        let today = Utc::now().date_naive();

        let created = service
            .create_driver(driver_input("Ana Ruiz", today + Duration::days(10)))
            .await
            .unwrap();
        assert_eq!(created.badge, ExpiryStatus::ExpiringSoon);

        let mut input = driver_input("Ana Ruiz Gil", today + Duration::days(400));
        input.active = false;
        let updated = service
            .update_driver(created.record.id, input)
            .await
            .unwrap();
        assert_eq!(updated.badge, ExpiryStatus::Valid);
        assert!(!updated.record.active);

        service.delete_driver(created.record.id).await.unwrap();
        let err = service.get_driver(created.record.id).await.unwrap_err();
        assert!(matches!(err, FleetError::NotFound { entity: "driver", .. }));
    }

    #[tokio::test]
    async fn test_invalid_driver_is_not_saved() {
        let (store, service) = service();
        let mut input = driver_input("", Utc::now().date_naive());
        input.email = Some("nope".into());

        let err = service.create_driver(input).await.unwrap_err();
        match err {
            FleetError::Validation(v) => {
                assert!(v.has_field("full_name"));
                assert!(v.has_field("email"));
            }
            other => panic!("expected validation error, got {other:?}"),
        }
        let all = store
            .list_drivers(&DriverFilter::default(), ExpiryWindow::today_with_default())
            .await
            .unwrap();
        assert!(all.is_empty());
    }

    #[tokio::test]
    async fn test_trip_requires_existing_references() {
        let (_, service) = service();
        let err = service
            .create_trip(trip_input(Uuid::new_v4(), Uuid::new_v4()))
            .await
            .unwrap_err();
        match err {
            FleetError::Validation(v) => {
                assert!(v.has_field("origin_location_id"));
                assert!(v.has_field("destination_location_id"));
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_create_trip_normalizes_container() {
        let (_, service) = service();
        let port = service
            .create_location(location_input("Port", LocationCategory::Port))
            .await
            .unwrap();
        let client = service
            .create_location(location_input("Client", LocationCategory::Client))
            .await
            .unwrap();

        let trip = service
            .create_trip(trip_input(port.id, client.id))
            .await
            .unwrap();
        assert_eq!(trip.status, TripStatus::Planned);
        assert_eq!(trip.container_number.as_deref(), Some("MSCU1234566"));

        let err = service.delete_location(port.id).await.unwrap_err();
        assert!(matches!(err, FleetError::Store(StoreError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_policy_requires_existing_asset() {
        let (_, service) = service();
        let today = Utc::now().date_naive();
        let input = InsurancePolicyInput {
            policy_number: "POL-77".into(),
            insurer: "Mapfre".into(),
            asset: InsuredAsset::Vehicle { id: Uuid::new_v4() },
            coverage: Coverage::Comprehensive,
            start_date: today,
            end_date: today + Duration::days(365),
            premium: Decimal::new(95000, 2),
        };
        let err = service.create_policy(input).await.unwrap_err();
        assert!(matches!(err, FleetError::Validation(ref v) if v.has_field("asset")));
    }

    #[tokio::test]
    async fn test_dashboard_counts_and_alerts() {
        let (_, service) = service();
        let today = Utc::now().date_naive();

        service
            .create_driver(driver_input("Expired Driver", today - Duration::days(1)))
            .await
            .unwrap();
        service
            .create_driver(driver_input("Fine", today + Duration::days(300)))
            .await
            .unwrap();
        let port = service
            .create_location(location_input("Port", LocationCategory::Port))
            .await
            .unwrap();
        let client = service
            .create_location(location_input("Client", LocationCategory::Client))
            .await
            .unwrap();
        service
            .create_trip(trip_input(port.id, client.id))
            .await
            .unwrap();

        let summary = service.dashboard().await.unwrap();
        assert_eq!(summary.trips.planned, 1);
        assert_eq!(summary.active_drivers, 2);
        assert_eq!(summary.alerts.len(), 1);
        assert_eq!(summary.alerts[0].subject, "driver_license");
        assert_eq!(summary.alerts[0].status, ExpiryStatus::Expired);
    }
}
