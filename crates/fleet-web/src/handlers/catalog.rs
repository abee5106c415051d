//! Stage catalog handlers.
//!
//! GET /api/catalog/:direction       — ordered stage definitions
//! GET /api/catalog/:direction/:tag  — one definition; 404 for unknown tags

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use fleet_types::{StageDefinition, TripDirection};

use crate::state::AppState;

pub async fn list(
    State(state): State<AppState>,
    Path(direction): Path<TripDirection>,
) -> Json<Vec<StageDefinition>> {
    Json(state.engine.catalog().for_direction(direction).to_vec())
}

pub async fn get(
    State(state): State<AppState>,
    Path((direction, tag)): Path<(TripDirection, String)>,
) -> Result<Json<StageDefinition>, StatusCode> {
    state
        .engine
        .catalog()
        .definition(direction, &tag)
        .cloned()
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}
