use crate::app::pipeline::render::{RenderReason, SlotRenderContext};
use crate::core::analytics::{self, AnalyticsEvent};
use crate::core::host::AdHost;
use crate::core::pipeline::Pipeline;
use crate::core::registry::SlotRegistry;
use crate::core::revenue::RevenueAccumulator;
use crate::core::scheduler::SlotRefresher;
use crate::core::viewability::{ViewabilityObserver, VisibilityStream};
use anyhow::Error;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{Instrument, debug, info_span, warn};

/// Runs the render pipeline for a slot and counts its impression once it
/// has been loaded and seen. Shared by the initial loads and the refresh
/// scheduler
pub(crate) struct SlotLoader {
    pub registry: Arc<SlotRegistry>,
    pub observer: Arc<ViewabilityObserver>,
    pub revenue: Arc<RevenueAccumulator>,
    pub host: Arc<dyn AdHost>,
    pub pipeline: Pipeline<SlotRenderContext, Error>,
    pub impression_threshold: f32,
}

impl SlotLoader {
    /// Renders `slot_id`, returns true when content was applied and recorded.
    /// Pipeline failures are logged and reported as not loaded
    pub async fn load(&self, slot_id: &str, reason: RenderReason) -> bool {
        let Some(slot) = self.registry.get(slot_id) else {
            debug!("Slot {} no longer registered, skipping {} render", slot_id, reason);
            return false;
        };

        let context = SlotRenderContext::new(slot, reason);
        let span = info_span!("render_slot", slot = slot_id, reason = reason.as_ref());

        if let Err(e) = self.pipeline.run(&context).instrument(span).await {
            warn!("Failed to render slot {}: {e:#}", slot_id);
            return false;
        }

        if !context.loaded() {
            return false;
        }

        // already in view when content arrived
        if reason == RenderReason::Initial
            && self.observer.is_visible(slot_id, self.impression_threshold)
        {
            self.count_impression(slot_id);
        }

        true
    }

    /// Credits the one impression allowed per page view for a loaded slot
    pub fn count_impression(&self, slot_id: &str) -> bool {
        if !self.registry.mark_impression(slot_id) {
            return false;
        }

        let total = self.revenue.record_impression(slot_id);
        self.host.revenue_display(total);
        analytics::emit(&AnalyticsEvent::AdImpression { slot: slot_id });

        true
    }

    /// Consumes visibility events for one slot until it is released
    pub async fn watch_impressions(self: Arc<Self>, slot_id: String, mut events: VisibilityStream) {
        while let Some(event) = events.recv().await {
            if event.ratio >= self.impression_threshold && self.count_impression(&slot_id) {
                debug!("Impression counted for slot {}", slot_id);
            }
        }

        debug!("Viewability stream for slot {} ended", slot_id);
    }
}

#[async_trait]
impl SlotRefresher for SlotLoader {
    async fn refresh(&self, slot_id: &str) -> bool {
        self.load(slot_id, RenderReason::Refresh).await
    }
}
