mod google;
mod registry;
mod scripted;
mod selector;

pub use google::GoogleRenderer;
pub use registry::NetworkRegistry;
pub use scripted::ScriptedRenderer;
pub use selector::select_network;

use crate::core::models::{NetworkConfig, SlotSize};

/// Produces the ad tag markup for one network. Implementations must be
/// deterministic for a given config and size so refreshes are idempotent
pub trait NetworkRenderer: Send + Sync {
    fn markup(&self, config: &NetworkConfig, slot_id: &str, size: SlotSize) -> String;
}
