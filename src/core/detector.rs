use crate::app::config::{AmbiguityPolicy, DetectorConfig};
use anyhow::Error;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Handle to a bait element inserted by a [`BaitSurface`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BaitId(pub u64);

/// Bait element styled to match what blocker filter lists hide
#[derive(Debug, Clone, PartialEq)]
pub struct BaitSpec {
    pub class_name: &'static str,
    pub content: &'static str,
    pub height_px: u32,
    /// Placed far off screen so it never shows to the user
    pub offscreen: bool,
}

impl Default for BaitSpec {
    fn default() -> Self {
        BaitSpec {
            class_name: "adsbox",
            content: "&nbsp;",
            height_px: 1,
            offscreen: true,
        }
    }
}

/// The rendering environment the probe runs against
pub trait BaitSurface: Send + Sync {
    fn insert_bait(&self, bait: &BaitSpec) -> Result<BaitId, Error>;

    /// Rendered height of the bait, `None` when it cannot be measured
    fn measure_height(&self, id: BaitId) -> Option<u32>;

    fn remove_bait(&self, id: BaitId);
}

/// Removes the bait however the probe exits, including cancellation
struct BaitGuard<'a> {
    surface: &'a dyn BaitSurface,
    id: BaitId,
}

impl Drop for BaitGuard<'_> {
    fn drop(&mut self) {
        self.surface.remove_bait(self.id);
    }
}

/// One-shot ad blocker probe. Inserts a bait element, waits the probe
/// delay, then reports blocked when the element was collapsed to zero height
pub struct AdBlockDetector {
    surface: Arc<dyn BaitSurface>,
    config: DetectorConfig,
    bait: BaitSpec,
}

impl AdBlockDetector {
    pub fn new(surface: Arc<dyn BaitSurface>, config: DetectorConfig) -> Self {
        AdBlockDetector {
            surface,
            config,
            bait: BaitSpec::default(),
        }
    }

    fn ambiguous(&self) -> bool {
        self.config.on_ambiguous == AmbiguityPolicy::AssumeBlocked
    }

    /// Never fails, a probe which cannot be measured resolves per the
    /// configured ambiguity policy
    pub async fn detect(&self) -> bool {
        let id = match self.surface.insert_bait(&self.bait) {
            Ok(id) => id,
            Err(e) => {
                warn!("Could not insert ad blocker bait: {e:#}");
                return self.ambiguous();
            }
        };

        let guard = BaitGuard {
            surface: self.surface.as_ref(),
            id,
        };

        tokio::time::sleep(self.config.probe_delay).await;

        let height = self.surface.measure_height(id);
        drop(guard);

        let blocked = match height {
            Some(0) => true,
            Some(h) => {
                debug!("Bait rendered at {}px", h);
                false
            }
            None => {
                warn!("Bait height could not be measured, applying {:?}", self.config.on_ambiguous);
                self.ambiguous()
            }
        };

        if blocked {
            info!("Ad blocker detected");
        }

        blocked
    }
}
