//! Fleet master data: drivers, vehicles, semi-trailers, insurance policies
//! and locations.
//!
//! Each record type has a matching `*Input` form used for both create and
//! update (full replacement, the way the admin forms submit).

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

crate::text_enum! {
    /// Operational status shared by vehicles and semi-trailers
    pub enum AssetStatus {
        Available => "available",
        InUse => "in_use",
        Maintenance => "maintenance",
        Inactive => "inactive",
    }
}

crate::text_enum! {
    pub enum TrailerType {
        ContainerChassis => "container_chassis",
        Reefer => "reefer",
        Tautliner => "tautliner",
        Flatbed => "flatbed",
        Tanker => "tanker",
    }
}

crate::text_enum! {
    pub enum Coverage {
        ThirdParty => "third_party",
        Comprehensive => "comprehensive",
        Cargo => "cargo",
    }
}

crate::text_enum! {
    /// Kind of place a location record describes
    pub enum LocationCategory {
        Port => "port",
        Customs => "customs",
        Client => "client",
        Depot => "depot",
    }
}

crate::text_enum! {
    /// Badge for a dated document (licence, inspection)
    pub enum ExpiryStatus {
        Valid => "valid",
        ExpiringSoon => "expiring_soon",
        Expired => "expired",
    }
}

crate::text_enum! {
    /// Badge for an insurance policy's validity window
    pub enum PolicyStatus {
        NotStarted => "not_started",
        Active => "active",
        ExpiringSoon => "expiring_soon",
        Expired => "expired",
    }
}

// ============================================================================
// DRIVER
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Driver {
    pub id: Uuid,
    pub full_name: String,
    pub national_id: String,
    pub license_number: String,
    pub license_expiry: NaiveDate,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriverInput {
    pub full_name: String,
    pub national_id: String,
    pub license_number: String,
    pub license_expiry: NaiveDate,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default = "default_true")]
    pub active: bool,
}

impl Driver {
    pub fn from_input(input: DriverInput) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            full_name: input.full_name,
            national_id: input.national_id,
            license_number: input.license_number,
            license_expiry: input.license_expiry,
            phone: input.phone,
            email: input.email,
            active: input.active,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply_input(&mut self, input: DriverInput) {
        self.full_name = input.full_name;
        self.national_id = input.national_id;
        self.license_number = input.license_number;
        self.license_expiry = input.license_expiry;
        self.phone = input.phone;
        self.email = input.email;
        self.active = input.active;
        self.updated_at = Utc::now();
    }
}

// ============================================================================
// VEHICLE
// ============================================================================

/// Tractor unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
    pub id: Uuid,
    pub plate: String,
    pub brand: String,
    pub model: String,
    #[serde(default)]
    pub year: Option<i32>,
    pub status: AssetStatus,
    #[serde(default)]
    pub inspection_expiry: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VehicleInput {
    pub plate: String,
    pub brand: String,
    pub model: String,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default = "default_asset_status")]
    pub status: AssetStatus,
    #[serde(default)]
    pub inspection_expiry: Option<NaiveDate>,
}

impl Vehicle {
    pub fn from_input(input: VehicleInput) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            plate: input.plate,
            brand: input.brand,
            model: input.model,
            year: input.year,
            status: input.status,
            inspection_expiry: input.inspection_expiry,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply_input(&mut self, input: VehicleInput) {
        self.plate = input.plate;
        self.brand = input.brand;
        self.model = input.model;
        self.year = input.year;
        self.status = input.status;
        self.inspection_expiry = input.inspection_expiry;
        self.updated_at = Utc::now();
    }
}

// ============================================================================
// SEMI-TRAILER
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SemiTrailer {
    pub id: Uuid,
    pub plate: String,
    pub trailer_type: TrailerType,
    #[serde(default)]
    pub max_load_kg: Option<i32>,
    pub status: AssetStatus,
    #[serde(default)]
    pub inspection_expiry: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SemiTrailerInput {
    pub plate: String,
    pub trailer_type: TrailerType,
    #[serde(default)]
    pub max_load_kg: Option<i32>,
    #[serde(default = "default_asset_status")]
    pub status: AssetStatus,
    #[serde(default)]
    pub inspection_expiry: Option<NaiveDate>,
}

impl SemiTrailer {
    pub fn from_input(input: SemiTrailerInput) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            plate: input.plate,
            trailer_type: input.trailer_type,
            max_load_kg: input.max_load_kg,
            status: input.status,
            inspection_expiry: input.inspection_expiry,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply_input(&mut self, input: SemiTrailerInput) {
        self.plate = input.plate;
        self.trailer_type = input.trailer_type;
        self.max_load_kg = input.max_load_kg;
        self.status = input.status;
        self.inspection_expiry = input.inspection_expiry;
        self.updated_at = Utc::now();
    }
}

// ============================================================================
// INSURANCE POLICY
// ============================================================================

/// The asset an insurance policy covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InsuredAsset {
    Vehicle { id: Uuid },
    SemiTrailer { id: Uuid },
}

impl InsuredAsset {
    pub fn id(&self) -> Uuid {
        match self {
            Self::Vehicle { id } | Self::SemiTrailer { id } => *id,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Vehicle { .. } => "vehicle",
            Self::SemiTrailer { .. } => "semi_trailer",
        }
    }

    /// Rebuild from the (kind, id) column pair
    pub fn from_parts(kind: &str, id: Uuid) -> Option<Self> {
        match kind {
            "vehicle" => Some(Self::Vehicle { id }),
            "semi_trailer" => Some(Self::SemiTrailer { id }),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsurancePolicy {
    pub id: Uuid,
    pub policy_number: String,
    pub insurer: String,
    pub asset: InsuredAsset,
    pub coverage: Coverage,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub premium: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsurancePolicyInput {
    pub policy_number: String,
    pub insurer: String,
    pub asset: InsuredAsset,
    pub coverage: Coverage,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub premium: Decimal,
}

impl InsurancePolicy {
    pub fn from_input(input: InsurancePolicyInput) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            policy_number: input.policy_number,
            insurer: input.insurer,
            asset: input.asset,
            coverage: input.coverage,
            start_date: input.start_date,
            end_date: input.end_date,
            premium: input.premium,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply_input(&mut self, input: InsurancePolicyInput) {
        self.policy_number = input.policy_number;
        self.insurer = input.insurer;
        self.asset = input.asset;
        self.coverage = input.coverage;
        self.start_date = input.start_date;
        self.end_date = input.end_date;
        self.premium = input.premium;
        self.updated_at = Utc::now();
    }
}

// ============================================================================
// LOCATION
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub id: Uuid,
    pub name: String,
    pub category: LocationCategory,
    #[serde(default)]
    pub address: Option<String>,
    pub city: String,
    pub country: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationInput {
    pub name: String,
    pub category: LocationCategory,
    #[serde(default)]
    pub address: Option<String>,
    pub city: String,
    pub country: String,
}

impl Location {
    pub fn from_input(input: LocationInput) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: input.name,
            category: input.category,
            address: input.address,
            city: input.city,
            country: input.country,
            created_at: Utc::now(),
        }
    }

    pub fn apply_input(&mut self, input: LocationInput) {
        self.name = input.name;
        self.category = input.category;
        self.address = input.address;
        self.city = input.city;
        self.country = input.country;
    }
}

/// A record together with its computed badge, flattened into one JSON object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WithBadge<T, B> {
    #[serde(flatten)]
    pub record: T,
    pub badge: B,
}

fn default_true() -> bool {
    true
}

fn default_asset_status() -> AssetStatus {
    AssetStatus::Available
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insured_asset_parts() {
        let id = Uuid::new_v4();
        let asset = InsuredAsset::SemiTrailer { id };
        assert_eq!(asset.kind(), "semi_trailer");
        assert_eq!(InsuredAsset::from_parts(asset.kind(), id), Some(asset));
        assert_eq!(InsuredAsset::from_parts("boat", id), None);
    }

    #[test]
    fn test_badge_is_flattened() {
        let location = Location::from_input(LocationInput {
            name: "Depot".into(),
            category: LocationCategory::Depot,
            address: None,
            city: "Bilbao".into(),
            country: "Spain".into(),
        });
        let json = serde_json::to_value(WithBadge {
            record: location,
            badge: ExpiryStatus::Valid,
        })
        .unwrap();
        assert_eq!(json["name"], "Depot");
        assert_eq!(json["badge"], "valid");
    }

    #[test]
    fn test_driver_input_defaults_to_active() {
        let input: DriverInput = serde_json::from_value(serde_json::json!({
            "full_name": "Ana Ruiz",
            "national_id": "12345678Z",
            "license_number": "C-998877",
            "license_expiry": "2030-01-31"
        }))
        .unwrap();
        assert!(input.active);
        assert!(input.email.is_none());
    }
}
