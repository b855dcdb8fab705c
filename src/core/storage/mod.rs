mod file;
mod memory;

pub use file::JsonFileStore;
pub use memory::MemoryStore;

use anyhow::{Context, Error};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::error;

/// Persisted key names, each holding an independent JSON document
pub mod keys {
    pub const AD_REVENUE: &str = "adRevenue";
    pub const OPTIMAL_PLACEMENTS: &str = "optimalAdPlacements";
    pub const PAGE_REVENUE: &str = "carGamesRevenue";
    pub const REVENUE_METRICS: &str = "revenueMetrics";
}

/// Flat string key-value storage, the equivalent of browser local storage
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, Error>;

    fn set(&self, key: &str, value: String) -> Result<(), Error>;
}

/// Reads the JSON document under `key`. Any fields present in storage
/// override the defaults of `T`, missing or unreadable documents
/// yield `T::default()` and the failure is logged
pub fn load_or_default<T>(store: &dyn KeyValueStore, key: &str) -> T
where
    T: DeserializeOwned + Default,
{
    match read_json(store, key) {
        Ok(Some(value)) => value,
        Ok(None) => T::default(),
        Err(e) => {
            error!("Error loading {key} from storage: {e:#}");
            T::default()
        }
    }
}

/// Writes `value` as JSON under `key`, logging rather than propagating failures
pub fn save_logged<T: Serialize>(store: &dyn KeyValueStore, key: &str, value: &T) -> bool {
    match write_json(store, key, value) {
        Ok(()) => true,
        Err(e) => {
            error!("Error saving {key} to storage: {e:#}");
            false
        }
    }
}

fn read_json<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Result<Option<T>, Error> {
    let Some(raw) = store.get(key)? else {
        return Ok(None);
    };

    let value = serde_json::from_str(&raw).with_context(|| format!("Malformed {key} document"))?;
    Ok(Some(value))
}

fn write_json<T: Serialize>(store: &dyn KeyValueStore, key: &str, value: &T) -> Result<(), Error> {
    let raw = serde_json::to_string(value)?;
    store.set(key, raw)
}
