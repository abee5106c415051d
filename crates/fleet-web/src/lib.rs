//! fleet-web — REST server for the fleet admin backend.
//!
//! The library half exposes [`router::build_router`] and [`state::AppState`]
//! so integration tests can drive the full router in-process.

pub mod error;
pub mod handlers;
pub mod router;
pub mod state;
