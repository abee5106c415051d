//! Trip-stage workflow
//!
//! - [`catalog`]: direction-keyed stage definitions loaded from YAML
//! - [`initializer`]: synthesizes a trip's stages from the catalog
//! - [`projection`]: pure stage-to-trip status rules
//! - [`engine`]: [`StageEngine`], the async orchestration over a [`crate::store::FleetStore`]

pub mod catalog;
pub mod engine;
pub mod initializer;
pub mod projection;

pub use catalog::StageCatalog;
pub use engine::StageEngine;
pub use projection::{project_status, status_from_stages};
