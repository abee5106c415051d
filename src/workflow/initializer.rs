//! Stage synthesis for a trip without stages

use chrono::{DateTime, Utc};

use fleet_types::{
    LocationCategory, Stage, StageDefinition, StageLocation, Trip, TripDirection,
};

use super::catalog::StageCatalog;

/// One incomplete stage per catalog entry for the trip's direction,
/// in catalog order.
pub fn build_stages(trip: &Trip, catalog: &StageCatalog, now: DateTime<Utc>) -> Vec<Stage> {
    catalog
        .for_direction(trip.direction)
        .iter()
        .enumerate()
        .map(|(position, definition)| {
            Stage::pending(
                trip.id,
                definition.tag.clone(),
                position as i32,
                initial_location(trip, definition),
                now,
            )
        })
        .collect()
}

/// Location assigned to a freshly created stage.
///
/// Return trips take the first menu option when the entry has one.
/// Otherwise port and customs stages sit at the port end of the trip and
/// client and depot stages at the far end.
pub fn initial_location(trip: &Trip, definition: &StageDefinition) -> Option<StageLocation> {
    if trip.direction == TripDirection::Return {
        if let Some(option) = definition.location_options.first() {
            return Some(StageLocation::Embedded(option.clone()));
        }
    }

    let outbound = trip.direction == TripDirection::Outbound;
    let location_id = match definition.location_category? {
        LocationCategory::Port | LocationCategory::Customs => {
            if outbound {
                trip.origin_location_id
            } else {
                trip.destination_location_id
            }
        }
        LocationCategory::Client | LocationCategory::Depot => {
            if outbound {
                trip.destination_location_id
            } else {
                trip.origin_location_id
            }
        }
    };
    Some(StageLocation::referenced(location_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use fleet_types::TripInput;
    use uuid::Uuid;

    fn trip(direction: TripDirection) -> Trip {
        Trip::from_input(TripInput {
            reference: "EXP-0001".into(),
            direction,
            origin_location_id: Uuid::new_v4(),
            destination_location_id: Uuid::new_v4(),
            driver_id: None,
            vehicle_id: None,
            semi_trailer_id: None,
            container_number: None,
            scheduled_departure: None,
            notes: None,
        })
    }

    #[test]
    fn test_outbound_stages_follow_catalog() {
        let catalog = StageCatalog::builtin().unwrap();
        let trip = trip(TripDirection::Outbound);
        let now = Utc::now();

        let stages = build_stages(&trip, &catalog, now);
        let definitions = catalog.for_direction(TripDirection::Outbound);
        assert_eq!(stages.len(), definitions.len());

        for (i, (stage, def)) in stages.iter().zip(definitions).enumerate() {
            assert_eq!(stage.stage_type, def.tag);
            assert_eq!(stage.position, i as i32);
            assert!(!stage.completed);
            assert!(stage.completed_at.is_none());
            assert_eq!(stage.scheduled_at, now);
            assert_eq!(stage.trip_id, trip.id);
        }

        let origin = Some(StageLocation::referenced(trip.origin_location_id));
        let destination = Some(StageLocation::referenced(trip.destination_location_id));
        assert_eq!(stages[0].location, origin); // port
        assert_eq!(stages[1].location, origin); // customs
        assert_eq!(stages[2].location, None); // in transit
        assert_eq!(stages[3].location, destination); // client
    }

    #[test]
    fn test_return_stages_mirror_locations_and_use_menu() {
        let catalog = StageCatalog::builtin().unwrap();
        let trip = trip(TripDirection::Return);

        let stages = build_stages(&trip, &catalog, Utc::now());
        assert_eq!(
            stages[0].location,
            Some(StageLocation::referenced(trip.origin_location_id))
        );
        assert_eq!(
            stages[1].location,
            Some(StageLocation::referenced(trip.destination_location_id))
        );

        let menu = &catalog
            .definition(TripDirection::Return, "empty_container_return")
            .unwrap()
            .location_options;
        assert_eq!(
            stages[2].location,
            Some(StageLocation::Embedded(menu[0].clone()))
        );
    }
}
