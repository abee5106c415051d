//! Postgres [`FleetStore`]
//!
//! Every enum is stored as text in its serde spelling. Stage locations use
//! a `location_kind` discriminator column with either `location_id` or the
//! three `embedded_*` columns populated (enforced by a CHECK constraint).

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use tracing::debug;
use uuid::Uuid;

use fleet_types::{
    Driver, EmbeddedLocation, InsurancePolicy, InsuredAsset, Location, SemiTrailer, Stage,
    StageLocation, Trip, TripStatus, Vehicle,
};

use super::FleetStore;
use crate::error::{StoreError, StoreResult};
use crate::filters::{
    like_pattern, search_term, AssetFilter, DateRange, DriverFilter, ExpiryWindow, LocationFilter,
    PolicyFilter, TripFilter,
};

const FOREIGN_KEY_VIOLATION: &str = "23503";
const UNIQUE_VIOLATION: &str = "23505";

pub struct PgFleetStore {
    pool: PgPool,
}

impl PgFleetStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn parse_enum<T: std::str::FromStr>(table: &'static str, value: &str) -> StoreResult<T>
where
    T::Err: std::fmt::Display,
{
    value.parse().map_err(|e| StoreError::corrupt(table, e))
}

/// Foreign-key and unique violations become [`StoreError::Conflict`]
fn map_constraint(err: sqlx::Error, what: &str) -> StoreError {
    let code = err
        .as_database_error()
        .and_then(|db| db.code())
        .map(|c| c.into_owned());
    match code.as_deref() {
        Some(FOREIGN_KEY_VIOLATION) => {
            StoreError::Conflict(format!("{} conflicts with a related record", what))
        }
        Some(UNIQUE_VIOLATION) => StoreError::Conflict(format!("{} already exists", what)),
        _ => StoreError::Database(err),
    }
}

fn push_date_range(qb: &mut QueryBuilder<'_, Postgres>, column: &str, range: DateRange) {
    if let Some(from) = range.from {
        qb.push(format!(" AND {} >= ", column));
        qb.push_bind(from);
    }
    if let Some(to) = range.to {
        qb.push(format!(" AND {} <= ", column));
        qb.push_bind(to);
    }
}

/// ` AND (a ILIKE $n OR b ILIKE $n ...)` for a non-empty search term
fn push_search(qb: &mut QueryBuilder<'_, Postgres>, columns: &[&str], search: &Option<String>) {
    let Some(term) = search_term(search) else {
        return;
    };
    let pattern = like_pattern(term);
    qb.push(" AND (");
    for (i, column) in columns.iter().enumerate() {
        if i > 0 {
            qb.push(" OR ");
        }
        qb.push(format!("{} ILIKE ", column));
        qb.push_bind(pattern.clone());
    }
    qb.push(")");
}

// =============================================================================
// ROWS
// =============================================================================

const DRIVER_COLUMNS: &str = "id, full_name, national_id, license_number, license_expiry, \
     phone, email, active, created_at, updated_at";

#[derive(Debug, FromRow)]
struct DriverRow {
    id: Uuid,
    full_name: String,
    national_id: String,
    license_number: String,
    license_expiry: NaiveDate,
    phone: Option<String>,
    email: Option<String>,
    active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<DriverRow> for Driver {
    fn from(row: DriverRow) -> Self {
        Self {
            id: row.id,
            full_name: row.full_name,
            national_id: row.national_id,
            license_number: row.license_number,
            license_expiry: row.license_expiry,
            phone: row.phone,
            email: row.email,
            active: row.active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

const VEHICLE_COLUMNS: &str =
    "id, plate, brand, model, year, status, inspection_expiry, created_at, updated_at";

#[derive(Debug, FromRow)]
struct VehicleRow {
    id: Uuid,
    plate: String,
    brand: String,
    model: String,
    year: Option<i32>,
    status: String,
    inspection_expiry: Option<NaiveDate>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<VehicleRow> for Vehicle {
    type Error = StoreError;

    fn try_from(row: VehicleRow) -> StoreResult<Self> {
        Ok(Self {
            id: row.id,
            plate: row.plate,
            brand: row.brand,
            model: row.model,
            year: row.year,
            status: parse_enum("vehicles", &row.status)?,
            inspection_expiry: row.inspection_expiry,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const SEMI_TRAILER_COLUMNS: &str =
    "id, plate, trailer_type, max_load_kg, status, inspection_expiry, created_at, updated_at";

#[derive(Debug, FromRow)]
struct SemiTrailerRow {
    id: Uuid,
    plate: String,
    trailer_type: String,
    max_load_kg: Option<i32>,
    status: String,
    inspection_expiry: Option<NaiveDate>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<SemiTrailerRow> for SemiTrailer {
    type Error = StoreError;

    fn try_from(row: SemiTrailerRow) -> StoreResult<Self> {
        Ok(Self {
            id: row.id,
            plate: row.plate,
            trailer_type: parse_enum("semi_trailers", &row.trailer_type)?,
            max_load_kg: row.max_load_kg,
            status: parse_enum("semi_trailers", &row.status)?,
            inspection_expiry: row.inspection_expiry,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const POLICY_COLUMNS: &str = "id, policy_number, insurer, asset_kind, asset_id, coverage, \
     start_date, end_date, premium, created_at, updated_at";

#[derive(Debug, FromRow)]
struct PolicyRow {
    id: Uuid,
    policy_number: String,
    insurer: String,
    asset_kind: String,
    asset_id: Uuid,
    coverage: String,
    start_date: NaiveDate,
    end_date: NaiveDate,
    premium: Decimal,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<PolicyRow> for InsurancePolicy {
    type Error = StoreError;

    fn try_from(row: PolicyRow) -> StoreResult<Self> {
        let asset = InsuredAsset::from_parts(&row.asset_kind, row.asset_id).ok_or_else(|| {
            StoreError::corrupt(
                "insurance_policies",
                format!("unknown asset kind '{}'", row.asset_kind),
            )
        })?;
        Ok(Self {
            id: row.id,
            policy_number: row.policy_number,
            insurer: row.insurer,
            asset,
            coverage: parse_enum("insurance_policies", &row.coverage)?,
            start_date: row.start_date,
            end_date: row.end_date,
            premium: row.premium,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const LOCATION_COLUMNS: &str = "id, name, category, address, city, country, created_at";

#[derive(Debug, FromRow)]
struct LocationRow {
    id: Uuid,
    name: String,
    category: String,
    address: Option<String>,
    city: String,
    country: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<LocationRow> for Location {
    type Error = StoreError;

    fn try_from(row: LocationRow) -> StoreResult<Self> {
        Ok(Self {
            id: row.id,
            name: row.name,
            category: parse_enum("locations", &row.category)?,
            address: row.address,
            city: row.city,
            country: row.country,
            created_at: row.created_at,
        })
    }
}

const TRIP_COLUMNS: &str = "id, reference, direction, origin_location_id, \
     destination_location_id, status, driver_id, vehicle_id, semi_trailer_id, \
     container_number, scheduled_departure, notes, created_at, updated_at";

#[derive(Debug, FromRow)]
struct TripRow {
    id: Uuid,
    reference: String,
    direction: String,
    origin_location_id: Uuid,
    destination_location_id: Uuid,
    status: String,
    driver_id: Option<Uuid>,
    vehicle_id: Option<Uuid>,
    semi_trailer_id: Option<Uuid>,
    container_number: Option<String>,
    scheduled_departure: Option<NaiveDate>,
    notes: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<TripRow> for Trip {
    type Error = StoreError;

    fn try_from(row: TripRow) -> StoreResult<Self> {
        Ok(Self {
            id: row.id,
            reference: row.reference,
            direction: parse_enum("trips", &row.direction)?,
            origin_location_id: row.origin_location_id,
            destination_location_id: row.destination_location_id,
            status: parse_enum("trips", &row.status)?,
            driver_id: row.driver_id,
            vehicle_id: row.vehicle_id,
            semi_trailer_id: row.semi_trailer_id,
            container_number: row.container_number,
            scheduled_departure: row.scheduled_departure,
            notes: row.notes,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const STAGE_COLUMNS: &str = "id, trip_id, stage_type, position, completed, scheduled_at, \
     completed_at, location_kind, location_id, embedded_name, embedded_city, \
     embedded_country, notes";

#[derive(Debug, FromRow)]
struct StageRow {
    id: Uuid,
    trip_id: Uuid,
    stage_type: String,
    position: i32,
    completed: bool,
    scheduled_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
    location_kind: Option<String>,
    location_id: Option<Uuid>,
    embedded_name: Option<String>,
    embedded_city: Option<String>,
    embedded_country: Option<String>,
    notes: Option<String>,
}

impl TryFrom<StageRow> for Stage {
    type Error = StoreError;

    fn try_from(row: StageRow) -> StoreResult<Self> {
        let location = match row.location_kind.as_deref() {
            None => None,
            Some("referenced") => {
                let id = row.location_id.ok_or_else(|| {
                    StoreError::corrupt("trip_stages", "referenced location without id")
                })?;
                Some(StageLocation::Referenced { location_id: id })
            }
            Some("embedded") => Some(StageLocation::Embedded(EmbeddedLocation {
                name: row.embedded_name.unwrap_or_default(),
                city: row.embedded_city.unwrap_or_default(),
                country: row.embedded_country.unwrap_or_default(),
            })),
            Some(other) => {
                return Err(StoreError::corrupt(
                    "trip_stages",
                    format!("unknown location kind '{}'", other),
                ))
            }
        };
        Ok(Self {
            id: row.id,
            trip_id: row.trip_id,
            stage_type: row.stage_type,
            position: row.position,
            completed: row.completed,
            scheduled_at: row.scheduled_at,
            completed_at: row.completed_at,
            location,
            notes: row.notes,
        })
    }
}

/// Column values for a stage location: (kind, location_id, name, city, country)
type LocationColumns<'a> = (
    Option<&'static str>,
    Option<Uuid>,
    Option<&'a str>,
    Option<&'a str>,
    Option<&'a str>,
);

fn location_columns(location: Option<&StageLocation>) -> LocationColumns<'_> {
    match location {
        None => (None, None, None, None, None),
        Some(StageLocation::Referenced { location_id }) => {
            (Some("referenced"), Some(*location_id), None, None, None)
        }
        Some(StageLocation::Embedded(e)) => (
            Some("embedded"),
            None,
            Some(e.name.as_str()),
            Some(e.city.as_str()),
            Some(e.country.as_str()),
        ),
    }
}

fn convert_all<R, T>(rows: Vec<R>) -> StoreResult<Vec<T>>
where
    T: TryFrom<R, Error = StoreError>,
{
    rows.into_iter().map(T::try_from).collect()
}

// =============================================================================
// STORE
// =============================================================================

#[async_trait]
impl FleetStore for PgFleetStore {
    // ── Drivers ──

    async fn save_driver(&self, d: &Driver) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO fleet.drivers
            (id, full_name, national_id, license_number, license_expiry,
             phone, email, active, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ON CONFLICT (id) DO UPDATE SET
                full_name = EXCLUDED.full_name,
                national_id = EXCLUDED.national_id,
                license_number = EXCLUDED.license_number,
                license_expiry = EXCLUDED.license_expiry,
                phone = EXCLUDED.phone,
                email = EXCLUDED.email,
                active = EXCLUDED.active,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(d.id)
        .bind(&d.full_name)
        .bind(&d.national_id)
        .bind(&d.license_number)
        .bind(d.license_expiry)
        .bind(&d.phone)
        .bind(&d.email)
        .bind(d.active)
        .bind(d.created_at)
        .bind(d.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_constraint(e, "driver"))?;
        Ok(())
    }

    async fn load_driver(&self, id: Uuid) -> StoreResult<Option<Driver>> {
        let row = sqlx::query_as::<_, DriverRow>(&format!(
            "SELECT {} FROM fleet.drivers WHERE id = $1",
            DRIVER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Into::into))
    }

    async fn list_drivers(
        &self,
        filter: &DriverFilter,
        window: ExpiryWindow,
    ) -> StoreResult<Vec<Driver>> {
        let mut qb = QueryBuilder::<Postgres>::new(format!(
            "SELECT {} FROM fleet.drivers WHERE 1=1",
            DRIVER_COLUMNS
        ));
        push_search(
            &mut qb,
            &["full_name", "national_id", "license_number"],
            &filter.search,
        );
        if let Some(active) = filter.active {
            qb.push(" AND active = ");
            qb.push_bind(active);
        }
        if let Some(status) = filter.license_status {
            push_date_range(&mut qb, "license_expiry", window.expiry_range(status));
        }
        qb.push(" ORDER BY full_name");

        let rows = qb
            .build_query_as::<DriverRow>()
            .fetch_all(&self.pool)
            .await?;
        debug!(count = rows.len(), "Listed drivers");
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn delete_driver(&self, id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM fleet.drivers WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // ── Vehicles ──

    async fn save_vehicle(&self, v: &Vehicle) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO fleet.vehicles
            (id, plate, brand, model, year, status, inspection_expiry, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (id) DO UPDATE SET
                plate = EXCLUDED.plate,
                brand = EXCLUDED.brand,
                model = EXCLUDED.model,
                year = EXCLUDED.year,
                status = EXCLUDED.status,
                inspection_expiry = EXCLUDED.inspection_expiry,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(v.id)
        .bind(&v.plate)
        .bind(&v.brand)
        .bind(&v.model)
        .bind(v.year)
        .bind(v.status.as_str())
        .bind(v.inspection_expiry)
        .bind(v.created_at)
        .bind(v.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_constraint(e, "vehicle"))?;
        Ok(())
    }

    async fn load_vehicle(&self, id: Uuid) -> StoreResult<Option<Vehicle>> {
        let row = sqlx::query_as::<_, VehicleRow>(&format!(
            "SELECT {} FROM fleet.vehicles WHERE id = $1",
            VEHICLE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Vehicle::try_from).transpose()
    }

    async fn list_vehicles(
        &self,
        filter: &AssetFilter,
        window: ExpiryWindow,
    ) -> StoreResult<Vec<Vehicle>> {
        let mut qb = QueryBuilder::<Postgres>::new(format!(
            "SELECT {} FROM fleet.vehicles WHERE 1=1",
            VEHICLE_COLUMNS
        ));
        push_search(&mut qb, &["plate", "brand", "model"], &filter.search);
        if let Some(status) = filter.status {
            qb.push(" AND status = ");
            qb.push_bind(status.as_str());
        }
        if let Some(status) = filter.inspection_status {
            qb.push(" AND inspection_expiry IS NOT NULL");
            push_date_range(&mut qb, "inspection_expiry", window.expiry_range(status));
        }
        qb.push(" ORDER BY plate");

        let rows = qb
            .build_query_as::<VehicleRow>()
            .fetch_all(&self.pool)
            .await?;
        convert_all(rows)
    }

    async fn delete_vehicle(&self, id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM fleet.vehicles WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // ── Semi-trailers ──

    async fn save_semi_trailer(&self, t: &SemiTrailer) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO fleet.semi_trailers
            (id, plate, trailer_type, max_load_kg, status, inspection_expiry, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (id) DO UPDATE SET
                plate = EXCLUDED.plate,
                trailer_type = EXCLUDED.trailer_type,
                max_load_kg = EXCLUDED.max_load_kg,
                status = EXCLUDED.status,
                inspection_expiry = EXCLUDED.inspection_expiry,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(t.id)
        .bind(&t.plate)
        .bind(t.trailer_type.as_str())
        .bind(t.max_load_kg)
        .bind(t.status.as_str())
        .bind(t.inspection_expiry)
        .bind(t.created_at)
        .bind(t.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_constraint(e, "semi-trailer"))?;
        Ok(())
    }

    async fn load_semi_trailer(&self, id: Uuid) -> StoreResult<Option<SemiTrailer>> {
        let row = sqlx::query_as::<_, SemiTrailerRow>(&format!(
            "SELECT {} FROM fleet.semi_trailers WHERE id = $1",
            SEMI_TRAILER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(SemiTrailer::try_from).transpose()
    }

    async fn list_semi_trailers(
        &self,
        filter: &AssetFilter,
        window: ExpiryWindow,
    ) -> StoreResult<Vec<SemiTrailer>> {
        let mut qb = QueryBuilder::<Postgres>::new(format!(
            "SELECT {} FROM fleet.semi_trailers WHERE 1=1",
            SEMI_TRAILER_COLUMNS
        ));
        push_search(&mut qb, &["plate"], &filter.search);
        if let Some(status) = filter.status {
            qb.push(" AND status = ");
            qb.push_bind(status.as_str());
        }
        if let Some(status) = filter.inspection_status {
            qb.push(" AND inspection_expiry IS NOT NULL");
            push_date_range(&mut qb, "inspection_expiry", window.expiry_range(status));
        }
        qb.push(" ORDER BY plate");

        let rows = qb
            .build_query_as::<SemiTrailerRow>()
            .fetch_all(&self.pool)
            .await?;
        convert_all(rows)
    }

    async fn delete_semi_trailer(&self, id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM fleet.semi_trailers WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // ── Insurance policies ──

    async fn save_policy(&self, p: &InsurancePolicy) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO fleet.insurance_policies
            (id, policy_number, insurer, asset_kind, asset_id, coverage,
             start_date, end_date, premium, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            ON CONFLICT (id) DO UPDATE SET
                policy_number = EXCLUDED.policy_number,
                insurer = EXCLUDED.insurer,
                asset_kind = EXCLUDED.asset_kind,
                asset_id = EXCLUDED.asset_id,
                coverage = EXCLUDED.coverage,
                start_date = EXCLUDED.start_date,
                end_date = EXCLUDED.end_date,
                premium = EXCLUDED.premium,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(p.id)
        .bind(&p.policy_number)
        .bind(&p.insurer)
        .bind(p.asset.kind())
        .bind(p.asset.id())
        .bind(p.coverage.as_str())
        .bind(p.start_date)
        .bind(p.end_date)
        .bind(p.premium)
        .bind(p.created_at)
        .bind(p.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_constraint(e, "insurance policy"))?;
        Ok(())
    }

    async fn load_policy(&self, id: Uuid) -> StoreResult<Option<InsurancePolicy>> {
        let row = sqlx::query_as::<_, PolicyRow>(&format!(
            "SELECT {} FROM fleet.insurance_policies WHERE id = $1",
            POLICY_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(InsurancePolicy::try_from).transpose()
    }

    async fn list_policies(
        &self,
        filter: &PolicyFilter,
        window: ExpiryWindow,
    ) -> StoreResult<Vec<InsurancePolicy>> {
        let mut qb = QueryBuilder::<Postgres>::new(format!(
            "SELECT {} FROM fleet.insurance_policies WHERE 1=1",
            POLICY_COLUMNS
        ));
        push_search(&mut qb, &["policy_number", "insurer"], &filter.search);
        if let Some(asset_id) = filter.asset_id {
            qb.push(" AND asset_id = ");
            qb.push_bind(asset_id);
        }
        if let Some(status) = filter.policy_status {
            let (starts, ends) = window.policy_ranges(status);
            push_date_range(&mut qb, "start_date", starts);
            push_date_range(&mut qb, "end_date", ends);
        }
        qb.push(" ORDER BY end_date, policy_number");

        let rows = qb
            .build_query_as::<PolicyRow>()
            .fetch_all(&self.pool)
            .await?;
        convert_all(rows)
    }

    async fn delete_policy(&self, id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM fleet.insurance_policies WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // ── Locations ──

    async fn save_location(&self, l: &Location) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO fleet.locations (id, name, category, address, city, country, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (id) DO UPDATE SET
                name = EXCLUDED.name,
                category = EXCLUDED.category,
                address = EXCLUDED.address,
                city = EXCLUDED.city,
                country = EXCLUDED.country
            "#,
        )
        .bind(l.id)
        .bind(&l.name)
        .bind(l.category.as_str())
        .bind(&l.address)
        .bind(&l.city)
        .bind(&l.country)
        .bind(l.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_constraint(e, "location"))?;
        Ok(())
    }

    async fn load_location(&self, id: Uuid) -> StoreResult<Option<Location>> {
        let row = sqlx::query_as::<_, LocationRow>(&format!(
            "SELECT {} FROM fleet.locations WHERE id = $1",
            LOCATION_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Location::try_from).transpose()
    }

    async fn list_locations(&self, filter: &LocationFilter) -> StoreResult<Vec<Location>> {
        let mut qb = QueryBuilder::<Postgres>::new(format!(
            "SELECT {} FROM fleet.locations WHERE 1=1",
            LOCATION_COLUMNS
        ));
        push_search(&mut qb, &["name", "city"], &filter.search);
        if let Some(category) = filter.category {
            qb.push(" AND category = ");
            qb.push_bind(category.as_str());
        }
        qb.push(" ORDER BY name");

        let rows = qb
            .build_query_as::<LocationRow>()
            .fetch_all(&self.pool)
            .await?;
        convert_all(rows)
    }

    async fn delete_location(&self, id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM fleet.locations WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| map_constraint(e, &format!("location {}", id)))?;
        Ok(result.rows_affected() > 0)
    }

    // ── Trips ──

    async fn save_trip(&self, t: &Trip) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO fleet.trips
            (id, reference, direction, origin_location_id, destination_location_id, status,
             driver_id, vehicle_id, semi_trailer_id, container_number, scheduled_departure,
             notes, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            ON CONFLICT (id) DO UPDATE SET
                reference = EXCLUDED.reference,
                direction = EXCLUDED.direction,
                origin_location_id = EXCLUDED.origin_location_id,
                destination_location_id = EXCLUDED.destination_location_id,
                status = EXCLUDED.status,
                driver_id = EXCLUDED.driver_id,
                vehicle_id = EXCLUDED.vehicle_id,
                semi_trailer_id = EXCLUDED.semi_trailer_id,
                container_number = EXCLUDED.container_number,
                scheduled_departure = EXCLUDED.scheduled_departure,
                notes = EXCLUDED.notes,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(t.id)
        .bind(&t.reference)
        .bind(t.direction.as_str())
        .bind(t.origin_location_id)
        .bind(t.destination_location_id)
        .bind(t.status.as_str())
        .bind(t.driver_id)
        .bind(t.vehicle_id)
        .bind(t.semi_trailer_id)
        .bind(&t.container_number)
        .bind(t.scheduled_departure)
        .bind(&t.notes)
        .bind(t.created_at)
        .bind(t.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_constraint(e, "trip"))?;
        Ok(())
    }

    async fn load_trip(&self, id: Uuid) -> StoreResult<Option<Trip>> {
        let row = sqlx::query_as::<_, TripRow>(&format!(
            "SELECT {} FROM fleet.trips WHERE id = $1",
            TRIP_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Trip::try_from).transpose()
    }

    async fn list_trips(&self, filter: &TripFilter) -> StoreResult<Vec<Trip>> {
        let mut qb = QueryBuilder::<Postgres>::new(format!(
            "SELECT {} FROM fleet.trips WHERE 1=1",
            TRIP_COLUMNS
        ));
        push_search(&mut qb, &["reference", "container_number"], &filter.search);
        if let Some(status) = filter.status {
            qb.push(" AND status = ");
            qb.push_bind(status.as_str());
        }
        if let Some(direction) = filter.direction {
            qb.push(" AND direction = ");
            qb.push_bind(direction.as_str());
        }
        if let Some(driver_id) = filter.driver_id {
            qb.push(" AND driver_id = ");
            qb.push_bind(driver_id);
        }
        let range = filter.departure_range();
        if !range.is_open() {
            qb.push(" AND scheduled_departure IS NOT NULL");
            push_date_range(&mut qb, "scheduled_departure", range);
        }
        qb.push(" ORDER BY created_at DESC");

        let rows = qb
            .build_query_as::<TripRow>()
            .fetch_all(&self.pool)
            .await?;
        convert_all(rows)
    }

    async fn update_trip_status(&self, id: Uuid, status: TripStatus) -> StoreResult<()> {
        sqlx::query("UPDATE fleet.trips SET status = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(status.as_str())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn delete_trip(&self, id: Uuid) -> StoreResult<bool> {
        // trip_stages cascade on delete
        let result = sqlx::query("DELETE FROM fleet.trips WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // ── Stages ──

    async fn insert_stages(&self, stages: &[Stage]) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;
        for s in stages {
            let (kind, location_id, name, city, country) = location_columns(s.location.as_ref());
            sqlx::query(
                r#"
                INSERT INTO fleet.trip_stages
                (id, trip_id, stage_type, position, completed, scheduled_at, completed_at,
                 location_kind, location_id, embedded_name, embedded_city, embedded_country, notes)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
                "#,
            )
            .bind(s.id)
            .bind(s.trip_id)
            .bind(&s.stage_type)
            .bind(s.position)
            .bind(s.completed)
            .bind(s.scheduled_at)
            .bind(s.completed_at)
            .bind(kind)
            .bind(location_id)
            .bind(name)
            .bind(city)
            .bind(country)
            .bind(&s.notes)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_constraint(e, "stage"))?;
        }
        // Dropping the transaction on an early return rolls it back
        tx.commit().await?;
        Ok(())
    }

    async fn load_stages(&self, trip_id: Uuid) -> StoreResult<Vec<Stage>> {
        let rows = sqlx::query_as::<_, StageRow>(&format!(
            "SELECT {} FROM fleet.trip_stages WHERE trip_id = $1 ORDER BY position, scheduled_at",
            STAGE_COLUMNS
        ))
        .bind(trip_id)
        .fetch_all(&self.pool)
        .await?;
        convert_all(rows)
    }

    async fn load_stage(&self, id: Uuid) -> StoreResult<Option<Stage>> {
        let row = sqlx::query_as::<_, StageRow>(&format!(
            "SELECT {} FROM fleet.trip_stages WHERE id = $1",
            STAGE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Stage::try_from).transpose()
    }

    async fn update_stage_completion(
        &self,
        id: Uuid,
        completed: bool,
        completed_at: Option<DateTime<Utc>>,
    ) -> StoreResult<()> {
        sqlx::query("UPDATE fleet.trip_stages SET completed = $2, completed_at = $3 WHERE id = $1")
            .bind(id)
            .bind(completed)
            .bind(completed_at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn update_stage_location(
        &self,
        id: Uuid,
        location: Option<&StageLocation>,
    ) -> StoreResult<()> {
        let (kind, location_id, name, city, country) = location_columns(location);
        sqlx::query(
            r#"
            UPDATE fleet.trip_stages
            SET location_kind = $2, location_id = $3,
                embedded_name = $4, embedded_city = $5, embedded_country = $6
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(kind)
        .bind(location_id)
        .bind(name)
        .bind(city)
        .bind(country)
        .execute(&self.pool)
        .await
        .map_err(|e| map_constraint(e, "stage location"))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Requires a database with `migrations/` applied.
    /// Run with: DATABASE_URL="postgresql:///fleet" cargo test --features database -- --ignored
    async fn store() -> PgFleetStore {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
        let pool = PgPool::connect(&url).await.expect("failed to connect");
        PgFleetStore::new(pool)
    }

    #[test]
    fn test_location_columns_are_exclusive() {
        let id = Uuid::new_v4();
        let referenced = StageLocation::referenced(id);
        assert_eq!(
            location_columns(Some(&referenced)),
            (Some("referenced"), Some(id), None, None, None)
        );

        let embedded = StageLocation::Embedded(EmbeddedLocation {
            name: "Depot".into(),
            city: "Bilbao".into(),
            country: "Spain".into(),
        });
        let (kind, location_id, name, _, _) = location_columns(Some(&embedded));
        assert_eq!(kind, Some("embedded"));
        assert!(location_id.is_none());
        assert_eq!(name, Some("Depot"));
    }

    #[tokio::test]
    #[ignore]
    async fn test_stage_location_round_trip() {
        use fleet_types::{LocationCategory, LocationInput, TripDirection, TripInput};

        let store = store().await;
        let origin = Location::from_input(LocationInput {
            name: "Port of Valencia".into(),
            category: LocationCategory::Port,
            address: None,
            city: "Valencia".into(),
            country: "Spain".into(),
        });
        let destination = Location::from_input(LocationInput {
            name: "Client warehouse".into(),
            category: LocationCategory::Client,
            address: None,
            city: "Madrid".into(),
            country: "Spain".into(),
        });
        store.save_location(&origin).await.unwrap();
        store.save_location(&destination).await.unwrap();

        let trip = Trip::from_input(TripInput {
            reference: format!("PG-{}", &Uuid::new_v4().to_string()[..8]),
            direction: TripDirection::Return,
            origin_location_id: destination.id,
            destination_location_id: origin.id,
            driver_id: None,
            vehicle_id: None,
            semi_trailer_id: None,
            container_number: None,
            scheduled_departure: None,
            notes: None,
        });
        store.save_trip(&trip).await.unwrap();

        let stage = Stage::pending(
            trip.id,
            "client_pickup",
            0,
            Some(StageLocation::referenced(destination.id)),
            Utc::now(),
        );
        store.insert_stages(&[stage.clone()]).await.unwrap();

        let embedded = StageLocation::Embedded(EmbeddedLocation {
            name: "Terminal".into(),
            city: "Valencia".into(),
            country: "Spain".into(),
        });
        store
            .update_stage_location(stage.id, Some(&embedded))
            .await
            .unwrap();
        let reloaded = store.load_stage(stage.id).await.unwrap().unwrap();
        assert_eq!(reloaded.location, Some(embedded));

        store.delete_trip(trip.id).await.unwrap();
        store.delete_location(origin.id).await.unwrap();
        store.delete_location(destination.id).await.unwrap();
    }
}
