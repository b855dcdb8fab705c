use crate::core::storage::KeyValueStore;
use anyhow::{Context, Error};
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Key-value store kept as a single JSON object on disk. Every
/// `set` rewrites the whole file synchronously, there is no batching
pub struct JsonFileStore {
    path: PathBuf,
    entries: RwLock<BTreeMap<String, String>>,
}

impl JsonFileStore {
    /// Opens the store at `path`, starting empty if the file does not exist yet
    pub fn open(path: &Path) -> Result<Self, Error> {
        let entries = if path.exists() {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("Failed reading store {}", path.display()))?;

            if raw.trim().is_empty() {
                BTreeMap::new()
            } else {
                serde_json::from_str(&raw)
                    .with_context(|| format!("Store {} is not a JSON object", path.display()))?
            }
        } else {
            debug!("Store {} not found, starting empty", path.display());
            BTreeMap::new()
        };

        Ok(JsonFileStore {
            path: path.to_path_buf(),
            entries: RwLock::new(entries),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>, Error> {
        Ok(self.entries.read().get(key).cloned())
    }

    fn set(&self, key: &str, value: String) -> Result<(), Error> {
        let mut entries = self.entries.write();
        let previous = entries.insert(key.to_string(), value);

        let written = serde_json::to_string_pretty(&*entries)
            .map_err(Error::from)
            .and_then(|raw| {
                std::fs::write(&self.path, raw)
                    .with_context(|| format!("Failed writing store {}", self.path.display()))
            });

        // keep memory and disk in step when the write fails
        if written.is_err() {
            match previous {
                Some(prev) => entries.insert(key.to_string(), prev),
                None => entries.remove(key),
            };
        }

        written
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        let mut path = std::env::temp_dir();
        path.push(format!("adslot-{}-{}.json", name, std::process::id()));
        let _ = std::fs::remove_file(&path);
        path
    }

    #[test]
    fn test_values_survive_reopen() {
        let path = temp_path("reopen");

        let store = JsonFileStore::open(&path).unwrap();
        store.set("adRevenue", r#"{"total":1.0}"#.to_string()).unwrap();
        drop(store);

        let reopened = JsonFileStore::open(&path).unwrap();
        assert_eq!(
            reopened.get("adRevenue").unwrap().as_deref(),
            Some(r#"{"total":1.0}"#)
        );

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_missing_file_opens_empty() {
        let path = temp_path("missing");
        let store = JsonFileStore::open(&path).unwrap();
        assert!(store.get("anything").unwrap().is_none());
    }

    #[test]
    fn test_failed_write_rolls_back() {
        let mut path = temp_path("no-dir");
        path.push("nested");
        path.push("store.json");

        let store = JsonFileStore::open(&path).unwrap();
        assert!(store.set("key", "value".to_string()).is_err());
        assert!(store.get("key").unwrap().is_none());
    }
}
