use crate::app::pipeline::render::context::SlotRenderContext;
use crate::child_span_info;
use crate::core::pipeline::BlockingTask;
use crate::core::render::Renderer;
use anyhow::{Error, anyhow, bail};
use std::sync::Arc;

pub struct RenderContentTask {
    renderer: Arc<Renderer>,
}

impl RenderContentTask {
    pub fn new(renderer: Arc<Renderer>) -> Self {
        Self { renderer }
    }
}

impl BlockingTask<SlotRenderContext, Error> for RenderContentTask {
    fn run(&self, context: &SlotRenderContext) -> Result<(), Error> {
        let span = child_span_info!(
            "render_content_task",
            slot = context.slot_id(),
            source = tracing::field::Empty
        );
        let _enter = span.enter();

        let Some(network) = context.network.get() else {
            bail!("Render attempted before network selection for slot {}", context.slot_id());
        };

        let content = self.renderer.render(&context.slot, network.as_ref());
        span.record("source", content.source());

        context
            .content
            .set(content)
            .map_err(|_| anyhow!("Content already rendered for slot {}", context.slot_id()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::config::FallbackConfig;
    use crate::app::pipeline::render::RenderReason;
    use crate::core::models::{AdSlot, ContentDescriptor, NetworkId, SlotDeclaration, SlotSize};
    use crate::core::networks::NetworkRegistry;
    use ahash::AHashMap;

    fn task(fallback_enabled: bool) -> RenderContentTask {
        let fallback = FallbackConfig {
            enabled: fallback_enabled,
            ..Default::default()
        };

        RenderContentTask::new(Arc::new(Renderer::new(
            NetworkRegistry::with_builtins(),
            AHashMap::new(),
            fallback,
        )))
    }

    fn context() -> SlotRenderContext {
        let slot = AdSlot::new(&SlotDeclaration::new("sidebar-ad", SlotSize::Skyscraper));
        SlotRenderContext::new(slot, RenderReason::Initial)
    }

    #[test]
    fn test_requires_network_selection() {
        assert!(task(true).run(&context()).is_err());
    }

    #[test]
    fn test_no_network_renders_house_ad() {
        let ctx = context();
        ctx.network.set(None).unwrap();

        task(true).run(&ctx).unwrap();
        assert!(matches!(ctx.content.get(), Some(ContentDescriptor::Fallback { .. })));
    }

    #[test]
    fn test_disabled_fallback_renders_empty() {
        let ctx = context();
        ctx.network.set(None).unwrap();

        task(false).run(&ctx).unwrap();
        assert_eq!(ctx.content.get(), Some(&ContentDescriptor::Empty));
    }

    #[test]
    fn test_unconfigured_network_falls_back() {
        let ctx = context();
        ctx.network.set(Some(NetworkId::from("google"))).unwrap();

        task(true).run(&ctx).unwrap();
        assert_eq!(ctx.content.get().unwrap().source(), "fallback");
    }
}
