use compact_str::CompactString;
use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::core::models::slot::SlotSize;

/// Stable identifier of an ad network, e.g. `google`
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NetworkId(CompactString);

impl NetworkId {
    pub fn new(id: &str) -> Self {
        NetworkId(CompactString::from(id))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<&str> for NetworkId {
    fn from(value: &str) -> Self {
        NetworkId::new(value)
    }
}

impl fmt::Display for NetworkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, Builder)]
#[builder(setter(into), default)]
#[serde(default)]
pub struct NetworkConfig {
    pub id: NetworkId,
    pub enabled: bool,
    /// Publisher level credential, the client id or site id depending on network
    pub publisher_id: String,
    /// Per size class unit ids keyed by the lowercase size name
    pub slots: HashMap<String, String>,
}

impl NetworkConfig {
    /// The unit id configured for this size, if any
    pub fn unit_for(&self, size: SlotSize) -> Option<&str> {
        self.slots.get(&size.to_string()).map(String::as_str)
    }
}
