use crate::core::storage::KeyValueStore;
use anyhow::Error;
use parking_lot::RwLock;
use std::collections::HashMap;

/// Process local store, contents are lost with the process
#[derive(Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, Error> {
        Ok(self.entries.read().get(key).cloned())
    }

    fn set(&self, key: &str, value: String) -> Result<(), Error> {
        self.entries.write().insert(key.to_string(), value);
        Ok(())
    }
}
