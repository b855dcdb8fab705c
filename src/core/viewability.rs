use dashmap::DashMap;
use futures_util::Stream;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tokio::time::Instant;
use tracing::debug;

#[derive(Debug, Clone, PartialEq)]
pub struct VisibilityEvent {
    pub slot_id: Arc<str>,
    /// Visible fraction of the slot, 0.0 to 1.0
    pub ratio: f32,
    pub at: Instant,
}

struct Observed {
    slot_id: Arc<str>,
    ratio: f32,
    /// How many thresholds the last reported ratio meets or exceeds
    band: usize,
    subscribers: Vec<UnboundedSender<VisibilityEvent>>,
}

/// Tracks the visible fraction of each slot as reported by the host and
/// fans out an event to subscribers whenever a configured threshold is crossed
pub struct ViewabilityObserver {
    thresholds: Vec<f32>,
    slots: DashMap<String, Observed>,
}

/// Infinite stream of visibility events for one slot. Ends once the slot
/// is released from the observer, dropping it cancels the subscription
pub struct VisibilityStream {
    rx: UnboundedReceiver<VisibilityEvent>,
}

impl VisibilityStream {
    pub async fn recv(&mut self) -> Option<VisibilityEvent> {
        self.rx.recv().await
    }
}

impl Stream for VisibilityStream {
    type Item = VisibilityEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.rx.poll_recv(cx)
    }
}

fn band_of(thresholds: &[f32], ratio: f32) -> usize {
    thresholds.iter().filter(|t| ratio >= **t).count()
}

impl ViewabilityObserver {
    /// `thresholds` are the visible fractions whose crossing emits an event
    pub fn new(mut thresholds: Vec<f32>) -> Self {
        thresholds.retain(|t| (0.0..=1.0).contains(t));
        thresholds.sort_by(f32::total_cmp);
        thresholds.dedup();

        ViewabilityObserver {
            thresholds,
            slots: DashMap::new(),
        }
    }

    pub fn thresholds(&self) -> &[f32] {
        &self.thresholds
    }

    /// Starts tracking a slot, a no-op for slots already tracked
    pub fn track(&self, slot_id: &str) {
        self.slots.entry(slot_id.to_string()).or_insert_with(|| Observed {
            slot_id: Arc::from(slot_id),
            ratio: 0.0,
            band: 0,
            subscribers: Vec::new(),
        });
    }

    /// Subscribes to events for `slot_id`, tracking it if needed
    pub fn observe(&self, slot_id: &str) -> VisibilityStream {
        self.track(slot_id);

        let (tx, rx) = unbounded_channel();
        if let Some(mut observed) = self.slots.get_mut(slot_id) {
            observed.subscribers.push(tx);
        }

        VisibilityStream { rx }
    }

    /// Stops tracking a slot, ending every stream subscribed to it
    pub fn release(&self, slot_id: &str) {
        if self.slots.remove(slot_id).is_some() {
            debug!("Released viewability subscriptions for slot {}", slot_id);
        }
    }

    pub fn release_all(&self) {
        self.slots.clear();
    }

    /// Host callback with the latest visible fraction of a slot. Untracked
    /// slots are ignored
    pub fn report(&self, slot_id: &str, ratio: f32) {
        let ratio = if ratio.is_nan() { 0.0 } else { ratio.clamp(0.0, 1.0) };

        let Some(mut observed) = self.slots.get_mut(slot_id) else {
            return;
        };

        observed.ratio = ratio;

        let band = band_of(&self.thresholds, ratio);
        if band == observed.band {
            return;
        }
        observed.band = band;

        let event = VisibilityEvent {
            slot_id: observed.slot_id.clone(),
            ratio,
            at: Instant::now(),
        };

        observed
            .subscribers
            .retain(|tx| tx.send(event.clone()).is_ok());
    }

    pub fn ratio(&self, slot_id: &str) -> Option<f32> {
        self.slots.get(slot_id).map(|o| o.ratio)
    }

    /// True when the last reported ratio meets `threshold`
    pub fn is_visible(&self, slot_id: &str, threshold: f32) -> bool {
        self.ratio(slot_id).is_some_and(|ratio| ratio > 0.0 && ratio >= threshold)
    }
}
