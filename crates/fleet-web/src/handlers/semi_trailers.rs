//! Semi-trailer handlers.
//!
//! GET    /api/semi-trailers      — list (query: search, status, inspection_status)
//! POST   /api/semi-trailers      — create
//! GET    /api/semi-trailers/:id  — fetch one
//! PUT    /api/semi-trailers/:id  — replace
//! DELETE /api/semi-trailers/:id  — delete

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use fleet_admin::filters::AssetFilter;
use fleet_admin::service::SemiTrailerView;
use fleet_types::SemiTrailerInput;

use crate::error::{ApiResult, AppError};
use crate::state::AppState;

pub async fn list(
    State(state): State<AppState>,
    Query(filter): Query<AssetFilter>,
) -> ApiResult<Vec<SemiTrailerView>> {
    Ok(Json(state.fleet.list_semi_trailers(&filter).await?))
}

pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<SemiTrailerView> {
    Ok(Json(state.fleet.get_semi_trailer(id).await?))
}

pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<SemiTrailerInput>,
) -> Result<(StatusCode, Json<SemiTrailerView>), AppError> {
    let trailer = state.fleet.create_semi_trailer(input).await?;
    Ok((StatusCode::CREATED, Json(trailer)))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<SemiTrailerInput>,
) -> ApiResult<SemiTrailerView> {
    Ok(Json(state.fleet.update_semi_trailer(id, input).await?))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.fleet.delete_semi_trailer(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
