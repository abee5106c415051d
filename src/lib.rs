//! Fleet administration backend
//!
//! Master-data CRUD for drivers, vehicles, semi-trailers, insurance policies
//! and locations, plus the trip-stage workflow engine.
//!
//! ```text
//! fleet-web (axum) ──► FleetService ─┐
//!                  └─► StageEngine ──┼──► dyn FleetStore ──► MemoryStore | PgFleetStore
//!                        │           │
//!                        └── StageCatalog (YAML, loaded once)
//! ```
//!
//! Enable the `database` feature for the Postgres store and the
//! [`database`] connection manager.

pub mod config;
#[cfg(feature = "database")]
pub mod database;
pub mod error;
pub mod filters;
pub mod rules;
pub mod service;
pub mod store;
pub mod validation;
pub mod workflow;

pub use config::AppConfig;
pub use error::{CatalogError, FleetError, FleetResult, StoreError, StoreResult};
pub use service::FleetService;
pub use store::{FleetStore, MemoryStore};
pub use workflow::{StageCatalog, StageEngine};

#[cfg(feature = "database")]
pub use store::PgFleetStore;
