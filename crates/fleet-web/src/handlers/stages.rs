//! Stage workflow handlers.
//!
//! GET  /api/trips/:id/stages             — ordered stages of a trip
//! POST /api/trips/:id/stages/initialize  — create stages from the catalog (no-op when present)
//! PUT  /api/stages/:id/completion        — { "completed": bool } → { stage, trip, status_changed }
//! PUT  /api/stages/:id/location          — { "location": StageLocation | null }

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use fleet_types::{Stage, StageCompletionRequest, StageLocationRequest, StageToggleOutcome};

use crate::error::ApiResult;
use crate::state::AppState;

pub async fn list(State(state): State<AppState>, Path(trip_id): Path<Uuid>) -> ApiResult<Vec<Stage>> {
    Ok(Json(state.engine.stages(trip_id).await?))
}

pub async fn initialize(
    State(state): State<AppState>,
    Path(trip_id): Path<Uuid>,
) -> ApiResult<Vec<Stage>> {
    Ok(Json(state.engine.initialize_stages(trip_id).await?))
}

pub async fn set_completion(
    State(state): State<AppState>,
    Path(stage_id): Path<Uuid>,
    Json(req): Json<StageCompletionRequest>,
) -> ApiResult<StageToggleOutcome> {
    Ok(Json(state.engine.toggle_stage(stage_id, req.completed).await?))
}

pub async fn set_location(
    State(state): State<AppState>,
    Path(stage_id): Path<Uuid>,
    Json(req): Json<StageLocationRequest>,
) -> ApiResult<Stage> {
    Ok(Json(
        state
            .engine
            .reassign_location(stage_id, req.location)
            .await?,
    ))
}
