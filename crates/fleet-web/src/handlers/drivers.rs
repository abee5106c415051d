//! Driver handlers.
//!
//! GET    /api/drivers      — list (query: search, active, license_status)
//! POST   /api/drivers      — create
//! GET    /api/drivers/:id  — fetch one
//! PUT    /api/drivers/:id  — replace
//! DELETE /api/drivers/:id  — delete; trips keep running without a driver

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use fleet_admin::filters::DriverFilter;
use fleet_admin::service::DriverView;
use fleet_types::DriverInput;

use crate::error::{ApiResult, AppError};
use crate::state::AppState;

pub async fn list(
    State(state): State<AppState>,
    Query(filter): Query<DriverFilter>,
) -> ApiResult<Vec<DriverView>> {
    Ok(Json(state.fleet.list_drivers(&filter).await?))
}

pub async fn get(State(state): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<DriverView> {
    Ok(Json(state.fleet.get_driver(id).await?))
}

pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<DriverInput>,
) -> Result<(StatusCode, Json<DriverView>), AppError> {
    let driver = state.fleet.create_driver(input).await?;
    Ok((StatusCode::CREATED, Json(driver)))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<DriverInput>,
) -> ApiResult<DriverView> {
    Ok(Json(state.fleet.update_driver(id, input).await?))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.fleet.delete_driver(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
