use crate::app::pipeline::render::context::{RenderReason, SlotRenderContext};
use crate::child_span_info;
use crate::core::analytics::{self, AnalyticsEvent};
use crate::core::host::AdHost;
use crate::core::pipeline::BlockingTask;
use crate::core::registry::SlotRegistry;
use crate::core::revenue::RevenueAccumulator;
use anyhow::Error;
use std::sync::Arc;
use tracing::debug;

/// Marks the slot loaded and counts the load. Skipped renders and
/// empty content record nothing
pub struct RecordLoadTask {
    registry: Arc<SlotRegistry>,
    revenue: Arc<RevenueAccumulator>,
    host: Arc<dyn AdHost>,
}

impl RecordLoadTask {
    pub fn new(
        registry: Arc<SlotRegistry>,
        revenue: Arc<RevenueAccumulator>,
        host: Arc<dyn AdHost>,
    ) -> Self {
        Self {
            registry,
            revenue,
            host,
        }
    }
}

impl BlockingTask<SlotRenderContext, Error> for RecordLoadTask {
    fn run(&self, context: &SlotRenderContext) -> Result<(), Error> {
        let span = child_span_info!("record_load_task", slot = context.slot_id());
        let _enter = span.enter();

        if !context.loaded() {
            return Ok(());
        }

        let content = match context.content.get() {
            Some(content) if content.is_ad() => content,
            _ => return Ok(()),
        };

        let refreshed = context.reason == RenderReason::Refresh;
        if !self.registry.record_load(
            context.slot_id(),
            content.network().cloned(),
            refreshed,
            context.started_at,
        ) {
            debug!("Slot {} removed during render, load not recorded", context.slot_id());
            return Ok(());
        }

        self.revenue.record_load(context.slot_id());
        self.host.revenue_display(self.revenue.state().total_revenue);

        analytics::emit(&AnalyticsEvent::AdLoad {
            slot: context.slot_id(),
            source: content.source(),
        });

        debug!("Ad loaded in {} from {}", context.slot_id(), content.source());

        Ok(())
    }
}
