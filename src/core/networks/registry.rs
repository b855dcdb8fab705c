use crate::core::models::NetworkId;
use crate::core::networks::{GoogleRenderer, NetworkRenderer, ScriptedRenderer};
use ahash::AHashMap;
use std::sync::Arc;

/// Maps network ids to their renderer. Adding a network is a
/// `register` call, not a new branch in the render path
#[derive(Default)]
pub struct NetworkRegistry {
    renderers: AHashMap<NetworkId, Arc<dyn NetworkRenderer>>,
}

impl NetworkRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry preloaded with google, mediavine, propeller and adsterra
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(NetworkId::new("google"), Arc::new(GoogleRenderer));
        registry.register(NetworkId::new("mediavine"), Arc::new(ScriptedRenderer::mediavine()));
        registry.register(NetworkId::new("propeller"), Arc::new(ScriptedRenderer::propeller()));
        registry.register(NetworkId::new("adsterra"), Arc::new(ScriptedRenderer::adsterra()));
        registry
    }

    pub fn register(&mut self, id: NetworkId, renderer: Arc<dyn NetworkRenderer>) {
        self.renderers.insert(id, renderer);
    }

    pub fn get(&self, id: &NetworkId) -> Option<Arc<dyn NetworkRenderer>> {
        self.renderers.get(id).cloned()
    }

    pub fn contains(&self, id: &NetworkId) -> bool {
        self.renderers.contains_key(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::{NetworkConfig, SlotSize};

    struct Custom;

    impl NetworkRenderer for Custom {
        fn markup(&self, _config: &NetworkConfig, slot_id: &str, _size: SlotSize) -> String {
            format!("<custom>{slot_id}</custom>")
        }
    }

    #[test]
    fn test_builtins_registered() {
        let registry = NetworkRegistry::with_builtins();
        for id in ["google", "mediavine", "propeller", "adsterra"] {
            assert!(registry.contains(&NetworkId::new(id)), "{id}");
        }
        assert!(!registry.contains(&NetworkId::new("unknown")));
    }

    #[test]
    fn test_registering_a_new_network() {
        let mut registry = NetworkRegistry::with_builtins();
        registry.register(NetworkId::new("custom"), Arc::new(Custom));

        let renderer = registry.get(&NetworkId::new("custom")).unwrap();
        let markup = renderer.markup(&NetworkConfig::default(), "top", SlotSize::Auto);
        assert_eq!(markup, "<custom>top</custom>");
    }
}
