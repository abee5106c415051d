//! Trip and stage types
//!
//! A trip carries a direction and an overall status. Its stages form an
//! ordered checklist drawn from the stage catalog for that direction.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::fleet::LocationCategory;

crate::text_enum! {
    /// Whether a trip leaves the port towards a client or comes back
    pub enum TripDirection {
        Outbound => "outbound",
        Return => "return",
    }
}

crate::text_enum! {
    /// Overall trip status
    pub enum TripStatus {
        Planned => "planned",
        EnRoute => "en_route",
        Completed => "completed",
        Incident => "incident",
        Cancelled => "cancelled",
    }
}

impl TripStatus {
    /// Cancelled trips are frozen: the stage engine refuses to touch them
    pub fn accepts_stage_changes(&self) -> bool {
        !matches!(self, Self::Cancelled)
    }
}

// ============================================================================
// TRIP
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trip {
    pub id: Uuid,
    /// Human trip code shown in listings (e.g. "EXP-2024-0113")
    pub reference: String,
    pub direction: TripDirection,
    pub origin_location_id: Uuid,
    pub destination_location_id: Uuid,
    pub status: TripStatus,
    #[serde(default)]
    pub driver_id: Option<Uuid>,
    #[serde(default)]
    pub vehicle_id: Option<Uuid>,
    #[serde(default)]
    pub semi_trailer_id: Option<Uuid>,
    #[serde(default)]
    pub container_number: Option<String>,
    #[serde(default)]
    pub scheduled_departure: Option<NaiveDate>,
    #[serde(default)]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Trip {
    /// Build a new planned trip from form input
    pub fn from_input(input: TripInput) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            reference: input.reference,
            direction: input.direction,
            origin_location_id: input.origin_location_id,
            destination_location_id: input.destination_location_id,
            status: TripStatus::Planned,
            driver_id: input.driver_id,
            vehicle_id: input.vehicle_id,
            semi_trailer_id: input.semi_trailer_id,
            container_number: input.container_number,
            scheduled_departure: input.scheduled_departure,
            notes: input.notes,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replace every editable field; status and identity are untouched
    pub fn apply_input(&mut self, input: TripInput) {
        self.reference = input.reference;
        self.direction = input.direction;
        self.origin_location_id = input.origin_location_id;
        self.destination_location_id = input.destination_location_id;
        self.driver_id = input.driver_id;
        self.vehicle_id = input.vehicle_id;
        self.semi_trailer_id = input.semi_trailer_id;
        self.container_number = input.container_number;
        self.scheduled_departure = input.scheduled_departure;
        self.notes = input.notes;
        self.updated_at = Utc::now();
    }
}

/// Create/update form for a trip. Status is deliberately absent: it only
/// moves through the stage engine and the cancel/incident actions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TripInput {
    pub reference: String,
    pub direction: TripDirection,
    pub origin_location_id: Uuid,
    pub destination_location_id: Uuid,
    #[serde(default)]
    pub driver_id: Option<Uuid>,
    #[serde(default)]
    pub vehicle_id: Option<Uuid>,
    #[serde(default)]
    pub semi_trailer_id: Option<Uuid>,
    #[serde(default)]
    pub container_number: Option<String>,
    #[serde(default)]
    pub scheduled_departure: Option<NaiveDate>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Body for the cancel / incident actions
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TripActionRequest {
    #[serde(default)]
    pub reason: Option<String>,
}

// ============================================================================
// STAGE
// ============================================================================

/// A location value stored directly on a stage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbeddedLocation {
    pub name: String,
    pub city: String,
    pub country: String,
}

/// Where a stage takes place.
///
/// Exactly one representation exists per stage: either a reference to a
/// persisted location record or an embedded value chosen from the
/// catalog's fixed menu.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StageLocation {
    Referenced { location_id: Uuid },
    Embedded(EmbeddedLocation),
}

impl StageLocation {
    pub fn referenced(location_id: Uuid) -> Self {
        Self::Referenced { location_id }
    }

    pub fn location_id(&self) -> Option<Uuid> {
        match self {
            Self::Referenced { location_id } => Some(*location_id),
            Self::Embedded(_) => None,
        }
    }

    pub fn embedded(&self) -> Option<&EmbeddedLocation> {
        match self {
            Self::Referenced { .. } => None,
            Self::Embedded(e) => Some(e),
        }
    }
}

/// One checklist step of a trip
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stage {
    pub id: Uuid,
    pub trip_id: Uuid,
    /// Catalog tag (e.g. "container_pickup")
    pub stage_type: String,
    /// Ordinal within the trip's catalog
    pub position: i32,
    pub completed: bool,
    pub scheduled_at: DateTime<Utc>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub location: Option<StageLocation>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl Stage {
    /// A fresh, incomplete stage scheduled for `now`
    pub fn pending(
        trip_id: Uuid,
        stage_type: impl Into<String>,
        position: i32,
        location: Option<StageLocation>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            trip_id,
            stage_type: stage_type.into(),
            position,
            completed: false,
            scheduled_at: now,
            completed_at: None,
            location,
            notes: None,
        }
    }
}

/// Request body for the completion toggle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageCompletionRequest {
    pub completed: bool,
}

/// Request body for location reassignment; `None` clears the location
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageLocationRequest {
    #[serde(default)]
    pub location: Option<StageLocation>,
}

/// Result of a completion toggle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageToggleOutcome {
    pub stage: Stage,
    /// Trip as re-read after the toggle
    pub trip: Trip,
    pub previous_status: TripStatus,
    pub status_changed: bool,
}

// ============================================================================
// STAGE CATALOG (wire form)
// ============================================================================

/// A stage-type definition as exposed to clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageDefinition {
    pub tag: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub requires_location: bool,
    #[serde(default)]
    pub location_category: Option<LocationCategory>,
    /// Fixed menu of embedded locations (return trips only)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub location_options: Vec<EmbeddedLocation>,
}

impl StageDefinition {
    pub fn has_location_menu(&self) -> bool {
        !self.location_options.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_location_is_internally_tagged() {
        let id = Uuid::new_v4();
        let referenced = serde_json::to_value(StageLocation::referenced(id)).unwrap();
        assert_eq!(referenced["type"], "referenced");
        assert_eq!(referenced["location_id"], id.to_string());

        let embedded = StageLocation::Embedded(EmbeddedLocation {
            name: "Terminal Norte".into(),
            city: "Valencia".into(),
            country: "Spain".into(),
        });
        let json = serde_json::to_value(&embedded).unwrap();
        assert_eq!(json["type"], "embedded");
        assert_eq!(json["city"], "Valencia");

        let back: StageLocation = serde_json::from_value(json).unwrap();
        assert_eq!(back, embedded);
        assert!(back.location_id().is_none());
    }

    #[test]
    fn test_apply_input_keeps_status() {
        let input = TripInput {
            reference: "EXP-1".into(),
            direction: TripDirection::Outbound,
            origin_location_id: Uuid::new_v4(),
            destination_location_id: Uuid::new_v4(),
            driver_id: None,
            vehicle_id: None,
            semi_trailer_id: None,
            container_number: None,
            scheduled_departure: None,
            notes: None,
        };
        let mut trip = Trip::from_input(input.clone());
        trip.status = TripStatus::EnRoute;

        let mut edited = input;
        edited.reference = "EXP-2".into();
        trip.apply_input(edited);

        assert_eq!(trip.reference, "EXP-2");
        assert_eq!(trip.status, TripStatus::EnRoute);
    }
}
