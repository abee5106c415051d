//! Stage Engine
//!
//! Drives a trip's stage checklist: creates the stages, toggles completion
//! and projects the trip status, reassigns stage locations. Also owns the
//! direct trip actions (cancel, incident) since they share the same status
//! rules.
//!
//! Every write is followed by a full re-read; nothing is applied
//! optimistically and a store failure aborts the action.

use chrono::Utc;
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

use fleet_types::{Stage, StageLocation, StageToggleOutcome, Trip, TripStatus};

use super::catalog::StageCatalog;
use super::initializer::build_stages;
use super::projection::{project_status, status_from_stages};
use crate::error::{FleetError, FleetResult, StoreError, ValidationErrors};
use crate::store::FleetStore;

/// The trip-stage workflow engine
#[derive(Clone)]
pub struct StageEngine {
    store: Arc<dyn FleetStore>,
    catalog: Arc<StageCatalog>,
}

impl StageEngine {
    pub fn new(store: Arc<dyn FleetStore>, catalog: Arc<StageCatalog>) -> Self {
        Self { store, catalog }
    }

    pub fn catalog(&self) -> &StageCatalog {
        &self.catalog
    }

    async fn require_trip(&self, trip_id: Uuid) -> FleetResult<Trip> {
        self.store
            .load_trip(trip_id)
            .await
            .map_err(log_store_error)?
            .ok_or_else(|| FleetError::not_found("trip", trip_id))
    }

    async fn require_stage(&self, stage_id: Uuid) -> FleetResult<Stage> {
        self.store
            .load_stage(stage_id)
            .await
            .map_err(log_store_error)?
            .ok_or_else(|| FleetError::not_found("stage", stage_id))
    }

    async fn load_stages(&self, trip_id: Uuid) -> FleetResult<Vec<Stage>> {
        Ok(self
            .store
            .load_stages(trip_id)
            .await
            .map_err(log_store_error)?)
    }

    fn ensure_open(trip: &Trip) -> FleetResult<()> {
        if trip.status.accepts_stage_changes() {
            Ok(())
        } else {
            Err(FleetError::invalid(format!(
                "trip {} is {}; its stages can no longer change",
                trip.reference, trip.status
            )))
        }
    }

    /// Ordered stages of an existing trip
    pub async fn stages(&self, trip_id: Uuid) -> FleetResult<Vec<Stage>> {
        self.require_trip(trip_id).await?;
        self.load_stages(trip_id).await
    }

    // =========================================================================
    // INITIALIZATION
    // =========================================================================

    /// Create the trip's stage set from the catalog.
    ///
    /// A trip that already has stages is returned unchanged.
    pub async fn initialize_stages(&self, trip_id: Uuid) -> FleetResult<Vec<Stage>> {
        let trip = self.require_trip(trip_id).await?;

        let existing = self.load_stages(trip_id).await?;
        if !existing.is_empty() {
            return Ok(existing);
        }
        Self::ensure_open(&trip)?;

        let stages = build_stages(&trip, &self.catalog, Utc::now());
        self.store
            .insert_stages(&stages)
            .await
            .map_err(log_store_error)?;

        info!(
            trip_id = %trip.id,
            direction = %trip.direction,
            count = stages.len(),
            "Initialized trip stages"
        );

        self.load_stages(trip_id).await
    }

    // =========================================================================
    // COMPLETION TOGGLE
    // =========================================================================

    /// Set a stage's completion flag and project the trip status
    pub async fn toggle_stage(
        &self,
        stage_id: Uuid,
        completed: bool,
    ) -> FleetResult<StageToggleOutcome> {
        let stage = self.require_stage(stage_id).await?;
        let trip = self.require_trip(stage.trip_id).await?;
        Self::ensure_open(&trip)?;

        let completed_at = match (completed, stage.completed) {
            (true, true) => stage.completed_at,
            (true, false) => Some(Utc::now()),
            (false, _) => None,
        };
        self.store
            .update_stage_completion(stage_id, completed, completed_at)
            .await
            .map_err(log_store_error)?;

        let stages = self.load_stages(trip.id).await?;
        let toggled = stages
            .iter()
            .find(|s| s.id == stage_id)
            .cloned()
            .ok_or_else(|| FleetError::not_found("stage", stage_id))?;

        let previous_status = trip.status;
        let next = project_status(
            previous_status,
            &stages,
            &toggled,
            self.catalog.first_outbound_tag(),
        );
        let status_changed = next != previous_status;

        let trip = if status_changed {
            self.store
                .update_trip_status(trip.id, next)
                .await
                .map_err(log_store_error)?;
            info!(
                trip_id = %trip.id,
                from = %previous_status,
                to = %next,
                stage = %toggled.stage_type,
                "Trip status projected from stages"
            );
            self.require_trip(trip.id).await?
        } else {
            trip
        };

        Ok(StageToggleOutcome {
            stage: toggled,
            trip,
            previous_status,
            status_changed,
        })
    }

    // =========================================================================
    // LOCATION REASSIGNMENT
    // =========================================================================

    /// Replace or clear a stage's location.
    ///
    /// Stage types with a location menu only accept one of its entries as an
    /// embedded location; other stage types only accept a reference to an
    /// existing location record.
    pub async fn reassign_location(
        &self,
        stage_id: Uuid,
        location: Option<StageLocation>,
    ) -> FleetResult<Stage> {
        let stage = self.require_stage(stage_id).await?;
        let trip = self.require_trip(stage.trip_id).await?;
        Self::ensure_open(&trip)?;

        if let Some(location) = &location {
            self.check_location(&trip, &stage, location).await?;
        }

        self.store
            .update_stage_location(stage_id, location.as_ref())
            .await
            .map_err(log_store_error)?;
        info!(
            stage_id = %stage_id,
            stage = %stage.stage_type,
            cleared = location.is_none(),
            "Stage location reassigned"
        );

        self.require_stage(stage_id).await
    }

    async fn check_location(
        &self,
        trip: &Trip,
        stage: &Stage,
        location: &StageLocation,
    ) -> FleetResult<()> {
        let definition = self
            .catalog
            .definition(trip.direction, &stage.stage_type)
            .filter(|d| d.requires_location)
            .ok_or_else(|| {
                ValidationErrors::single(
                    "location",
                    format!("stage '{}' does not take a location", stage.stage_type),
                )
            })?;

        match location {
            StageLocation::Embedded(choice) if definition.has_location_menu() => {
                if definition.location_options.contains(choice) {
                    Ok(())
                } else {
                    Err(ValidationErrors::single(
                        "location",
                        format!("'{}' is not an option for {}", choice.name, definition.name),
                    )
                    .into())
                }
            }
            StageLocation::Embedded(_) => Err(ValidationErrors::single(
                "location",
                format!("{} requires a registered location", definition.name),
            )
            .into()),
            StageLocation::Referenced { .. } if definition.has_location_menu() => {
                Err(ValidationErrors::single(
                    "location",
                    format!("{} must be chosen from its location menu", definition.name),
                )
                .into())
            }
            StageLocation::Referenced { location_id } => {
                let exists = self
                    .store
                    .load_location(*location_id)
                    .await
                    .map_err(log_store_error)?
                    .is_some();
                if exists {
                    Ok(())
                } else {
                    Err(ValidationErrors::single(
                        "location",
                        format!("location {} does not exist", location_id),
                    )
                    .into())
                }
            }
        }
    }

    // =========================================================================
    // TRIP ACTIONS
    // =========================================================================

    /// Cancel a trip. Completed trips cannot be cancelled; cancelling twice
    /// is a no-op.
    pub async fn cancel_trip(&self, trip_id: Uuid, reason: Option<String>) -> FleetResult<Trip> {
        let trip = self.require_trip(trip_id).await?;
        match trip.status {
            TripStatus::Cancelled => Ok(trip),
            TripStatus::Completed => Err(FleetError::invalid(format!(
                "trip {} is already completed",
                trip.reference
            ))),
            _ => {
                self.set_status(trip, TripStatus::Cancelled, "Cancelled", reason)
                    .await
            }
        }
    }

    /// Flag an incident on a planned or running trip
    pub async fn report_incident(
        &self,
        trip_id: Uuid,
        reason: Option<String>,
    ) -> FleetResult<Trip> {
        let trip = self.require_trip(trip_id).await?;
        match trip.status {
            TripStatus::Incident => Ok(trip),
            TripStatus::Planned | TripStatus::EnRoute => {
                self.set_status(trip, TripStatus::Incident, "Incident", reason)
                    .await
            }
            other => Err(FleetError::invalid(format!(
                "cannot report an incident on a {} trip",
                other
            ))),
        }
    }

    /// Return an incident trip to the status its stages imply
    pub async fn resolve_incident(
        &self,
        trip_id: Uuid,
        note: Option<String>,
    ) -> FleetResult<Trip> {
        let trip = self.require_trip(trip_id).await?;
        if trip.status != TripStatus::Incident {
            return Err(FleetError::invalid(format!(
                "trip {} has no open incident",
                trip.reference
            )));
        }
        let stages = self.load_stages(trip.id).await?;
        let status = status_from_stages(&stages, self.catalog.first_outbound_tag());
        self.set_status(trip, status, "Resolved", note).await
    }

    async fn set_status(
        &self,
        mut trip: Trip,
        status: TripStatus,
        label: &str,
        reason: Option<String>,
    ) -> FleetResult<Trip> {
        let previous = trip.status;
        trip.status = status;
        trip.updated_at = Utc::now();
        if let Some(reason) = reason.as_deref().map(str::trim).filter(|r| !r.is_empty()) {
            let line = format!("{}: {}", label, reason);
            trip.notes = Some(match trip.notes.take() {
                Some(notes) if !notes.is_empty() => format!("{}\n{}", notes, line),
                _ => line,
            });
        }
        self.store.save_trip(&trip).await.map_err(log_store_error)?;

        warn!(
            trip_id = %trip.id,
            from = %previous,
            to = %status,
            "Trip status set directly"
        );
        self.require_trip(trip.id).await
    }
}

fn log_store_error(err: StoreError) -> StoreError {
    error!(error = %err, "Stage engine store operation failed");
    err
}
