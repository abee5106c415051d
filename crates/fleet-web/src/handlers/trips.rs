//! Trip handlers.
//!
//! GET    /api/trips                        — list (query: search, status, direction, driver_id, from, to)
//! POST   /api/trips                        — create (status starts as planned)
//! GET    /api/trips/:id                    — fetch one
//! PUT    /api/trips/:id                    — replace editable fields; status is not accepted
//! DELETE /api/trips/:id                    — delete with its stages
//! POST   /api/trips/:id/cancel             — cancel
//! POST   /api/trips/:id/incident           — report an incident
//! POST   /api/trips/:id/resolve-incident   — back to the status the stages imply

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use fleet_admin::filters::TripFilter;
use fleet_types::{Trip, TripActionRequest, TripInput};

use crate::error::{ApiResult, AppError};
use crate::state::AppState;

pub async fn list(
    State(state): State<AppState>,
    Query(filter): Query<TripFilter>,
) -> ApiResult<Vec<Trip>> {
    Ok(Json(state.fleet.list_trips(&filter).await?))
}

pub async fn get(State(state): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<Trip> {
    Ok(Json(state.fleet.get_trip(id).await?))
}

pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<TripInput>,
) -> Result<(StatusCode, Json<Trip>), AppError> {
    let trip = state.fleet.create_trip(input).await?;
    Ok((StatusCode::CREATED, Json(trip)))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<TripInput>,
) -> ApiResult<Trip> {
    Ok(Json(state.fleet.update_trip(id, input).await?))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.fleet.delete_trip(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn cancel(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    body: Option<Json<TripActionRequest>>,
) -> ApiResult<Trip> {
    let reason = body.and_then(|Json(b)| b.reason);
    Ok(Json(state.engine.cancel_trip(id, reason).await?))
}

pub async fn report_incident(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    body: Option<Json<TripActionRequest>>,
) -> ApiResult<Trip> {
    let reason = body.and_then(|Json(b)| b.reason);
    Ok(Json(state.engine.report_incident(id, reason).await?))
}

pub async fn resolve_incident(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    body: Option<Json<TripActionRequest>>,
) -> ApiResult<Trip> {
    let note = body.and_then(|Json(b)| b.reason);
    Ok(Json(state.engine.resolve_incident(id, note).await?))
}
