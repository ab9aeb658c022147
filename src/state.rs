use std::sync::Arc;

use crate::config::Config;
use crate::db::{MemStorage, Storage};
use crate::ws::{dispatcher, DispatcherHandle};

/// Shared by every handler; cheap to clone
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Storage>,
    pub dispatcher: DispatcherHandle,
    pub config: Arc<Config>,
}

impl AppState {
    /// Fresh in-memory store with its dispatcher task. Must run inside a Tokio runtime.
    pub fn new(config: Config) -> Self {
        let store: Arc<dyn Storage> = Arc::new(MemStorage::new());
        let dispatcher = dispatcher::spawn(store.clone());
        Self {
            store,
            dispatcher,
            config: Arc::new(config),
        }
    }
}
