use crate::app::lifecycle::context::StartupContext;
use crate::core::pipeline::BlockingTask;
use crate::core::storage::{JsonFileStore, KeyValueStore, MemoryStore};
use anyhow::{Error, anyhow};
use std::sync::Arc;
use tracing::{info, instrument};

/// Opens the persistent store, in-memory when no path is configured
pub struct StorageOpenTask;

impl BlockingTask<StartupContext, Error> for StorageOpenTask {
    #[instrument(skip_all, name = "storage_open_task")]
    fn run(&self, context: &StartupContext) -> Result<(), Error> {
        let config = context
            .config
            .get()
            .ok_or_else(|| anyhow!("Config not loaded before storage open"))?;

        let store: Arc<dyn KeyValueStore> = match &config.storage.path {
            Some(path) => {
                let store = JsonFileStore::open(path)?;
                info!("Opened storage at {}", store.path().display());
                Arc::new(store)
            }
            None => {
                info!("No storage path configured, values will not outlive the session");
                Arc::new(MemoryStore::new())
            }
        };

        context
            .store
            .set(store)
            .map_err(|_| anyhow!("Storage already opened"))
    }
}
