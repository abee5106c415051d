//! Location handlers.
//!
//! GET    /api/locations      — list (query: search, category)
//! POST   /api/locations      — create
//! GET    /api/locations/:id  — fetch one
//! PUT    /api/locations/:id  — replace
//! DELETE /api/locations/:id  — delete; 409 while a trip or stage uses it

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use fleet_admin::filters::LocationFilter;
use fleet_types::{Location, LocationInput};

use crate::error::{ApiResult, AppError};
use crate::state::AppState;

pub async fn list(
    State(state): State<AppState>,
    Query(filter): Query<LocationFilter>,
) -> ApiResult<Vec<Location>> {
    Ok(Json(state.fleet.list_locations(&filter).await?))
}

pub async fn get(State(state): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<Location> {
    Ok(Json(state.fleet.get_location(id).await?))
}

pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<LocationInput>,
) -> Result<(StatusCode, Json<Location>), AppError> {
    let location = state.fleet.create_location(input).await?;
    Ok((StatusCode::CREATED, Json(location)))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<LocationInput>,
) -> ApiResult<Location> {
    Ok(Json(state.fleet.update_location(id, input).await?))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.fleet.delete_location(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
