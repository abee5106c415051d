//! Stage-to-trip status projection
//!
//! Pure functions: no I/O, no clock. The engine always feeds them the stage
//! set as re-read from the store after a write.

use fleet_types::{Stage, TripStatus};

/// Trip status after `toggled` changed its completion flag.
///
/// `stages` is the trip's full ordered stage set (including `toggled` in its
/// new state). First match wins:
/// 1. an incident stays open until it is resolved
/// 2. every stage complete: `Completed`
/// 3. a completed trip stays completed (projection is forward-only)
/// 4. the first stage, tagged `first_outbound_tag`, was just completed: `EnRoute`
/// 5. otherwise `current`
pub fn project_status(
    current: TripStatus,
    stages: &[Stage],
    toggled: &Stage,
    first_outbound_tag: &str,
) -> TripStatus {
    if current == TripStatus::Incident {
        return current;
    }
    if all_complete(stages) {
        return TripStatus::Completed;
    }
    if current == TripStatus::Completed {
        return current;
    }
    let is_first_stage = stages.first().is_some_and(|s| s.id == toggled.id);
    if is_first_stage && toggled.stage_type == first_outbound_tag && toggled.completed {
        return TripStatus::EnRoute;
    }
    current
}

/// Status implied by the stage set alone, used when an incident is resolved
pub fn status_from_stages(stages: &[Stage], first_outbound_tag: &str) -> TripStatus {
    if all_complete(stages) {
        return TripStatus::Completed;
    }
    match stages.first() {
        Some(first) if first.completed && first.stage_type == first_outbound_tag => {
            TripStatus::EnRoute
        }
        _ => TripStatus::Planned,
    }
}

/// An empty stage set is never complete
pub fn all_complete(stages: &[Stage]) -> bool {
    !stages.is_empty() && stages.iter().all(|s| s.completed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use proptest::prelude::*;
    use uuid::Uuid;

    const FIRST: &str = "container_pickup";
    const TAGS: [&str; 4] = [FIRST, "customs_clearance", "in_transit", "client_delivery"];

    fn stages(flags: &[bool]) -> Vec<Stage> {
        let trip_id = Uuid::new_v4();
        let now = Utc::now();
        flags
            .iter()
            .enumerate()
            .map(|(i, done)| {
                let mut s = Stage::pending(trip_id, TAGS[i % TAGS.len()], i as i32, None, now);
                s.completed = *done;
                s
            })
            .collect()
    }

    #[test]
    fn test_completing_last_stage_completes_trip() {
        let set = stages(&[true, true, true, true]);
        let status = project_status(TripStatus::EnRoute, &set, &set[3], FIRST);
        assert_eq!(status, TripStatus::Completed);
    }

    #[test]
    fn test_first_outbound_stage_starts_trip() {
        let set = stages(&[true, false, false, false]);
        let status = project_status(TripStatus::Planned, &set, &set[0], FIRST);
        assert_eq!(status, TripStatus::EnRoute);
    }

    #[test]
    fn test_first_stage_with_other_tag_does_not_start_trip() {
        let set = stages(&[true, false]);
        let status = project_status(TripStatus::Planned, &set, &set[0], "client_pickup");
        assert_eq!(status, TripStatus::Planned);
    }

    #[test]
    fn test_uncompleting_first_stage_keeps_status() {
        let set = stages(&[false, false, false]);
        let status = project_status(TripStatus::EnRoute, &set, &set[0], FIRST);
        assert_eq!(status, TripStatus::EnRoute);
    }

    #[test]
    fn test_incident_is_not_cleared_by_stages() {
        let started = stages(&[true, false, false]);
        assert_eq!(
            project_status(TripStatus::Incident, &started, &started[0], FIRST),
            TripStatus::Incident
        );
        let done = stages(&[true, true, true]);
        assert_eq!(
            project_status(TripStatus::Incident, &done, &done[2], FIRST),
            TripStatus::Incident
        );
    }

    #[test]
    fn test_status_from_stages() {
        assert_eq!(status_from_stages(&[], FIRST), TripStatus::Planned);
        assert_eq!(
            status_from_stages(&stages(&[true, false]), FIRST),
            TripStatus::EnRoute
        );
        assert_eq!(
            status_from_stages(&stages(&[true, true]), FIRST),
            TripStatus::Completed
        );
        assert_eq!(
            status_from_stages(&stages(&[false, true]), FIRST),
            TripStatus::Planned
        );
    }

    fn any_status() -> impl Strategy<Value = TripStatus> {
        prop::sample::select(TripStatus::ALL.to_vec())
    }

    fn open_status() -> impl Strategy<Value = TripStatus> {
        any_status().prop_filter("incident is sticky", |s| *s != TripStatus::Incident)
    }

    proptest! {
        #[test]
        fn prop_all_complete_always_projects_completed(
            len in 1usize..8,
            toggled in 0usize..8,
            current in open_status(),
        ) {
            let set = stages(&vec![true; len]);
            let toggled = &set[toggled % len];
            prop_assert_eq!(project_status(current, &set, toggled, FIRST), TripStatus::Completed);
        }

        #[test]
        fn prop_completed_never_regresses(
            flags in prop::collection::vec(any::<bool>(), 1..8),
            toggled in 0usize..8,
        ) {
            let set = stages(&flags);
            let toggled = &set[toggled % set.len()];
            prop_assert_eq!(
                project_status(TripStatus::Completed, &set, toggled, FIRST),
                TripStatus::Completed
            );
        }

        #[test]
        fn prop_non_first_stage_never_changes_incomplete_trip(
            flags in prop::collection::vec(any::<bool>(), 2..8),
            toggled in 1usize..8,
            current in any_status(),
        ) {
            let mut flags = flags;
            // keep at least one stage open
            flags[0] = false;
            let set = stages(&flags);
            let toggled = &set[1 + toggled % (set.len() - 1)];
            prop_assert_eq!(project_status(current, &set, toggled, FIRST), current);
        }

        #[test]
        fn prop_incident_never_changes(
            flags in prop::collection::vec(any::<bool>(), 1..8),
            toggled in 0usize..8,
        ) {
            let set = stages(&flags);
            let toggled = &set[toggled % set.len()];
            prop_assert_eq!(
                project_status(TripStatus::Incident, &set, toggled, FIRST),
                TripStatus::Incident
            );
        }

        #[test]
        fn prop_projection_only_moves_to_en_route_or_completed(
            flags in prop::collection::vec(any::<bool>(), 1..8),
            toggled in 0usize..8,
            current in any_status(),
        ) {
            let set = stages(&flags);
            let toggled = &set[toggled % set.len()];
            let next = project_status(current, &set, toggled, FIRST);
            prop_assert!(
                next == current || next == TripStatus::EnRoute || next == TripStatus::Completed
            );
        }
    }
}
