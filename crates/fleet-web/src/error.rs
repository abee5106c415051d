//! HTTP error mapping
//!
//! | error                        | status |
//! |------------------------------|--------|
//! | validation                   | 422    |
//! | not found                    | 404    |
//! | invalid operation / conflict | 409    |
//! | other store failure          | 500    |

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use fleet_admin::{FleetError, StoreError};

#[derive(Debug)]
pub struct AppError(pub FleetError);

impl From<FleetError> for AppError {
    fn from(err: FleetError) -> Self {
        Self(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (code, body) = match self.0 {
            FleetError::Validation(v) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                serde_json::json!({ "error": "validation failed", "fields": v.fields }),
            ),
            err @ FleetError::NotFound { .. } => (
                StatusCode::NOT_FOUND,
                serde_json::json!({ "error": err.to_string() }),
            ),
            FleetError::InvalidOperation(msg) => {
                (StatusCode::CONFLICT, serde_json::json!({ "error": msg }))
            }
            FleetError::Store(StoreError::Conflict(msg)) => {
                (StatusCode::CONFLICT, serde_json::json!({ "error": msg }))
            }
            FleetError::Store(err) => {
                tracing::error!(error = %err, "Request failed on the store");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    serde_json::json!({ "error": "internal storage error" }),
                )
            }
        };
        (code, Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<Json<T>, AppError>;
