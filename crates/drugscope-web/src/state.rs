//! Shared application state for the web server.

use std::sync::Arc;

use drugscope_config::QueryConfig;
use drugscope_db::{ConnectionManager, DrugBackend};
use drugscope_query::DrugExplorer;

/// Shared state injected into every Axum handler.
pub struct AppState {
    pub explorer: DrugExplorer,
}

impl AppState {
    pub fn new(explorer: DrugExplorer) -> Self {
        Self { explorer }
    }

    /// Wire a backend straight into a fresh connection manager.
    pub fn from_backend(backend: Arc<dyn DrugBackend>, config: &QueryConfig) -> Self {
        let manager = Arc::new(ConnectionManager::new(backend, config));
        Self::new(DrugExplorer::new(manager, config))
    }

    pub fn manager(&self) -> &ConnectionManager {
        self.explorer.manager()
    }
}

pub type SharedState = Arc<AppState>;
