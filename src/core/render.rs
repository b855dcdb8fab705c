use crate::app::config::FallbackConfig;
use crate::core::markup::escape;
use crate::core::models::{AdSlot, ContentDescriptor, NetworkConfig, NetworkId};
use crate::core::networks::NetworkRegistry;
use ahash::AHashMap;
use tracing::warn;

/// Builds slot content from static network configs and fallback settings.
/// Output depends only on the slot size, the network and the configs
pub struct Renderer {
    networks: NetworkRegistry,
    configs: AHashMap<NetworkId, NetworkConfig>,
    fallback: FallbackConfig,
}

impl Renderer {
    pub fn new(
        networks: NetworkRegistry,
        configs: AHashMap<NetworkId, NetworkConfig>,
        fallback: FallbackConfig,
    ) -> Self {
        Renderer {
            networks,
            configs,
            fallback,
        }
    }

    pub fn configs(&self) -> &AHashMap<NetworkId, NetworkConfig> {
        &self.configs
    }

    pub fn can_render(&self, network: &NetworkId) -> bool {
        self.networks.contains(network) && self.configs.contains_key(network)
    }

    pub fn render(&self, slot: &AdSlot, network: Option<&NetworkId>) -> ContentDescriptor {
        let Some(network) = network else {
            return self.fallback();
        };

        let (Some(renderer), Some(config)) = (self.networks.get(network), self.configs.get(network))
        else {
            warn!("No renderer registered for network {}, using fallback", network);
            return self.fallback();
        };

        ContentDescriptor::Network {
            network: network.clone(),
            markup: renderer.markup(config, &slot.id, slot.size),
        }
    }

    /// House ad, or `Empty` when fallback content is disabled
    pub fn fallback(&self) -> ContentDescriptor {
        if !self.fallback.enabled {
            return ContentDescriptor::Empty;
        }

        let markup = format!(
            r#"<a href="{link}" target="_blank" class="fallback-ad" data-ad-type="fallback"><img src="{image}" alt="Advertisement"><div class="fallback-overlay"><span class="fallback-cta">{cta}</span><span class="fallback-badge">Your Ad Here</span></div></a>"#,
            link = escape(&self.fallback.link),
            image = escape(&self.fallback.image),
            cta = escape(&self.fallback.cta),
        );

        ContentDescriptor::Fallback {
            link: self.fallback.link.clone(),
            markup,
        }
    }
}
