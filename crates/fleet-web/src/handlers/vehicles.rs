//! Vehicle handlers.
//!
//! GET    /api/vehicles      — list (query: search, status, inspection_status)
//! POST   /api/vehicles      — create
//! GET    /api/vehicles/:id  — fetch one
//! PUT    /api/vehicles/:id  — replace
//! DELETE /api/vehicles/:id  — delete

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use fleet_admin::filters::AssetFilter;
use fleet_admin::service::VehicleView;
use fleet_types::VehicleInput;

use crate::error::{ApiResult, AppError};
use crate::state::AppState;

pub async fn list(
    State(state): State<AppState>,
    Query(filter): Query<AssetFilter>,
) -> ApiResult<Vec<VehicleView>> {
    Ok(Json(state.fleet.list_vehicles(&filter).await?))
}

pub async fn get(State(state): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<VehicleView> {
    Ok(Json(state.fleet.get_vehicle(id).await?))
}

pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<VehicleInput>,
) -> Result<(StatusCode, Json<VehicleView>), AppError> {
    let vehicle = state.fleet.create_vehicle(input).await?;
    Ok((StatusCode::CREATED, Json(vehicle)))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<VehicleInput>,
) -> ApiResult<VehicleView> {
    Ok(Json(state.fleet.update_vehicle(id, input).await?))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.fleet.delete_vehicle(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
