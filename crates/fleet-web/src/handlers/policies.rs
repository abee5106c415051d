//! Insurance policy handlers.
//!
//! GET    /api/insurance-policies      — list (query: search, policy_status, asset_id)
//! POST   /api/insurance-policies      — create
//! GET    /api/insurance-policies/:id  — fetch one
//! PUT    /api/insurance-policies/:id  — replace
//! DELETE /api/insurance-policies/:id  — delete

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use fleet_admin::filters::PolicyFilter;
use fleet_admin::service::PolicyView;
use fleet_types::InsurancePolicyInput;

use crate::error::{ApiResult, AppError};
use crate::state::AppState;

pub async fn list(
    State(state): State<AppState>,
    Query(filter): Query<PolicyFilter>,
) -> ApiResult<Vec<PolicyView>> {
    Ok(Json(state.fleet.list_policies(&filter).await?))
}

pub async fn get(State(state): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<PolicyView> {
    Ok(Json(state.fleet.get_policy(id).await?))
}

pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<InsurancePolicyInput>,
) -> Result<(StatusCode, Json<PolicyView>), AppError> {
    let policy = state.fleet.create_policy(input).await?;
    Ok((StatusCode::CREATED, Json(policy)))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<InsurancePolicyInput>,
) -> ApiResult<PolicyView> {
    Ok(Json(state.fleet.update_policy(id, input).await?))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.fleet.delete_policy(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
