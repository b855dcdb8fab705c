use crate::core::models::{AdSlot, ContentDescriptor, NetworkId, SlotSize};
use std::sync::OnceLock;
use strum::{AsRefStr, Display};
use tokio::time::Instant;

/// Why a slot is being rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum RenderReason {
    /// First content for this page view
    Initial,
    /// Replaces already loaded content
    Refresh,
}

/// Context for the pipeline which renders one slot
#[derive(Debug)]
pub struct SlotRenderContext {
    pub slot: AdSlot,
    pub reason: RenderReason,
    /// When this render was started, used for the load timestamps
    pub started_at: Instant,
    /// Network picked by priority, `None` means fallback content
    pub network: OnceLock<Option<NetworkId>>,
    /// Content produced for the slot
    pub content: OnceLock<ContentDescriptor>,
    /// Whether the host accepted the content. False when the
    /// slot container vanished, the render is then skipped
    pub applied: OnceLock<bool>,
}

impl SlotRenderContext {
    pub fn new(slot: AdSlot, reason: RenderReason) -> SlotRenderContext {
        Self {
            slot,
            reason,
            started_at: Instant::now(),
            network: OnceLock::new(),
            content: OnceLock::new(),
            applied: OnceLock::new(),
        }
    }

    pub fn slot_id(&self) -> &str {
        &self.slot.id
    }

    pub fn size(&self) -> SlotSize {
        self.slot.size
    }

    /// True once content was applied and recorded as a load
    pub fn loaded(&self) -> bool {
        self.applied.get().copied().unwrap_or(false)
            && self.content.get().is_some_and(ContentDescriptor::is_ad)
    }

    /// True when the host had no container for the slot
    pub fn skipped(&self) -> bool {
        matches!(self.applied.get(), Some(false))
    }
}
