use crate::app::pipeline::render::context::SlotRenderContext;
use crate::child_span_info;
use crate::core::models::NetworkId;
use crate::core::networks::select_network;
use crate::core::pipeline::BlockingTask;
use crate::core::render::Renderer;
use anyhow::{Error, anyhow};
use std::sync::Arc;
use tracing::debug;

/// Picks the first enabled network by priority. Enabled networks
/// without a registered renderer are passed over
pub struct SelectNetworkTask {
    priority: Vec<NetworkId>,
    renderer: Arc<Renderer>,
}

impl SelectNetworkTask {
    pub fn new(priority: Vec<NetworkId>, renderer: Arc<Renderer>) -> Self {
        let priority = priority
            .into_iter()
            .filter(|network| renderer.can_render(network))
            .collect();

        Self { priority, renderer }
    }
}

impl BlockingTask<SlotRenderContext, Error> for SelectNetworkTask {
    fn run(&self, context: &SlotRenderContext) -> Result<(), Error> {
        let span = child_span_info!(
            "select_network_task",
            slot = context.slot_id(),
            network = tracing::field::Empty
        );
        let _enter = span.enter();

        let network = select_network(&self.priority, self.renderer.configs());

        match &network {
            Some(network) => {
                span.record("network", network.as_str());
            }
            None => debug!("No enabled network for slot {}, using fallback", context.slot_id()),
        }

        context
            .network
            .set(network)
            .map_err(|_| anyhow!("Network already selected for slot {}", context.slot_id()))
    }
}
