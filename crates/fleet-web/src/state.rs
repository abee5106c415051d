//! Shared handler state

use std::sync::Arc;

use fleet_admin::{FleetService, FleetStore, MemoryStore, StageCatalog, StageEngine};

#[derive(Clone)]
pub struct AppState {
    pub fleet: FleetService,
    pub engine: StageEngine,
}

impl AppState {
    pub fn new(store: Arc<dyn FleetStore>, catalog: Arc<StageCatalog>, warning_days: i64) -> Self {
        Self {
            fleet: FleetService::new(Arc::clone(&store), warning_days),
            engine: StageEngine::new(store, catalog),
        }
    }

    /// State over an empty [`MemoryStore`]
    pub fn in_memory(catalog: Arc<StageCatalog>, warning_days: i64) -> Self {
        Self::new(Arc::new(MemoryStore::new()), catalog, warning_days)
    }
}
