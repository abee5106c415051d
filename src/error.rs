//! Error handling for the fleet admin backend
//!
//! Three kinds of failure reach callers:
//! - persistence failures ([`StoreError`]): logged, the action is aborted, no retry
//! - validation failures ([`ValidationErrors`]): collected per field and returned together
//! - lookup misses on records an operation requires ([`FleetError::NotFound`])
//!
//! Lookup misses that only affect rendering (unknown stage tag, missing
//! related record in a listing) are `Option`s, not errors.

use thiserror::Error;
use uuid::Uuid;

pub use crate::validation::{FieldError, ValidationErrors};

/// Main error type for fleet operations
#[derive(Error, Debug)]
pub enum FleetError {
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: Uuid },

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),
}

impl FleetError {
    pub fn not_found(entity: &'static str, id: Uuid) -> Self {
        Self::NotFound { entity, id }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidOperation(message.into())
    }
}

/// Persistence failures raised by a [`crate::store::FleetStore`]
#[derive(Error, Debug)]
pub enum StoreError {
    #[cfg(feature = "database")]
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Corrupt row in {table}: {message}")]
    CorruptRow { table: &'static str, message: String },

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    pub fn corrupt(table: &'static str, message: impl std::fmt::Display) -> Self {
        Self::CorruptRow {
            table,
            message: message.to_string(),
        }
    }
}

/// Errors raised while loading the stage catalog
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Failed to read catalog {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Catalog has no stages for direction '{0}'")]
    EmptyDirection(String),

    #[error("Duplicate stage tag '{tag}' in direction '{direction}'")]
    DuplicateTag { direction: String, tag: String },

    #[error("Stage '{tag}' requires a location but declares neither a category nor a menu")]
    MissingLocationRule { tag: String },

    #[error("Stage '{tag}' declares a location menu outside the return direction")]
    MenuOutsideReturn { tag: String },

    #[error("First outbound stage '{0}' is not an outbound stage")]
    UnknownFirstOutbound(String),
}

pub type FleetResult<T> = Result<T, FleetError>;
pub type StoreResult<T> = Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message() {
        let id = Uuid::nil();
        let err = FleetError::not_found("trip", id);
        assert_eq!(err.to_string(), format!("trip {} not found", id));
    }

    #[test]
    fn test_store_error_converts() {
        let err: FleetError = StoreError::Unavailable("injected".into()).into();
        assert!(matches!(err, FleetError::Store(StoreError::Unavailable(_))));
    }
}
