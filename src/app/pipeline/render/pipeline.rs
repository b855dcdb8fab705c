use crate::app::pipeline::render::context::SlotRenderContext;
use crate::app::pipeline::render::tasks;
use crate::core::host::AdHost;
use crate::core::models::NetworkId;
use crate::core::pipeline::{Pipeline, PipelineBuilder};
use crate::core::registry::SlotRegistry;
use crate::core::render::Renderer;
use crate::core::revenue::RevenueAccumulator;
use anyhow::Error;
use std::sync::Arc;

/// Builds the pipeline which renders a single slot: picks the highest
/// priority enabled network, renders its markup (or the fallback house
/// ad), applies it through the host and records the load
pub fn build_render_pipeline(
    priority: Vec<NetworkId>,
    renderer: Arc<Renderer>,
    host: Arc<dyn AdHost>,
    registry: Arc<SlotRegistry>,
    revenue: Arc<RevenueAccumulator>,
) -> Pipeline<SlotRenderContext, Error> {
    PipelineBuilder::new()
        .with_blocking(Box::new(tasks::SelectNetworkTask::new(
            priority,
            renderer.clone(),
        )))
        .with_blocking(Box::new(tasks::RenderContentTask::new(renderer)))
        .with_blocking(Box::new(tasks::ApplyContentTask::new(host.clone())))
        .with_blocking(Box::new(tasks::RecordLoadTask::new(registry, revenue, host)))
        .build()
        .expect("Render pipeline should have tasks")
}
