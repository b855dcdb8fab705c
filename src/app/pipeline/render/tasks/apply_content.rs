use crate::app::pipeline::render::context::SlotRenderContext;
use crate::child_span_info;
use crate::core::host::AdHost;
use crate::core::pipeline::BlockingTask;
use anyhow::{Error, anyhow, bail};
use std::sync::Arc;
use tracing::debug;

/// Hands rendered content to the host. A slot whose container no
/// longer exists is marked skipped, not failed
pub struct ApplyContentTask {
    host: Arc<dyn AdHost>,
}

impl ApplyContentTask {
    pub fn new(host: Arc<dyn AdHost>) -> Self {
        Self { host }
    }
}

impl BlockingTask<SlotRenderContext, Error> for ApplyContentTask {
    fn run(&self, context: &SlotRenderContext) -> Result<(), Error> {
        let span = child_span_info!("apply_content_task", slot = context.slot_id());
        let _enter = span.enter();

        let Some(content) = context.content.get() else {
            bail!("No content rendered for slot {}", context.slot_id());
        };

        let applied = self.host.apply(context.slot_id(), content);
        if !applied {
            debug!("Container for slot {} missing, skipping render", context.slot_id());
        }

        context
            .applied
            .set(applied)
            .map_err(|_| anyhow!("Content already applied for slot {}", context.slot_id()))
    }
}
