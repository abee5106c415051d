use axum::{extract::State, Json};

use fleet_types::DashboardSummary;

use crate::error::ApiResult;
use crate::state::AppState;

/// GET /api/dashboard — trip counts, available assets and expiry alerts
pub async fn summary(State(state): State<AppState>) -> ApiResult<DashboardSummary> {
    Ok(Json(state.fleet.dashboard().await?))
}
