use crate::app::config::RefreshConfig;
use crate::core::registry::SlotRegistry;
use crate::core::viewability::ViewabilityObserver;
use crate::sample_or_attach_root_span;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use strum::Display;
use tokio::sync::Notify;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{Instrument, debug, info};

/// Re-renders one slot, returns true when new content was applied
#[async_trait]
pub trait SlotRefresher: Send + Sync {
    async fn refresh(&self, slot_id: &str) -> bool;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum RefreshState {
    /// Not started or between ticks
    Idle,
    /// Timer armed for the next tick
    Scheduled,
    Executing,
    /// Session cap reached, permanent for the session
    Exhausted,
}

/// Periodically refreshes loaded, visible slots which are outside the
/// post click cool-down, up to a session wide cap of refreshes
pub struct RefreshScheduler {
    rules: RefreshConfig,
    registry: Arc<SlotRegistry>,
    observer: Arc<ViewabilityObserver>,
    refresher: Arc<dyn SlotRefresher>,
    state: Mutex<RefreshState>,
    refreshes: AtomicU32,
    span_sample_rate: f32,
    shutdown: Notify,
}

impl RefreshScheduler {
    pub fn new(
        rules: RefreshConfig,
        registry: Arc<SlotRegistry>,
        observer: Arc<ViewabilityObserver>,
        refresher: Arc<dyn SlotRefresher>,
        span_sample_rate: f32,
    ) -> Self {
        RefreshScheduler {
            rules,
            registry,
            observer,
            refresher,
            state: Mutex::new(RefreshState::Idle),
            refreshes: AtomicU32::new(0),
            span_sample_rate,
            shutdown: Notify::new(),
        }
    }

    pub fn state(&self) -> RefreshState {
        *self.state.lock()
    }

    /// Refreshes executed so far this session
    pub fn refresh_count(&self) -> u32 {
        self.refreshes.load(Ordering::Acquire)
    }

    fn set_state(&self, state: RefreshState) {
        let mut current = self.state.lock();
        if *current != RefreshState::Exhausted {
            *current = state;
        }
    }

    fn exhausted(&self) -> bool {
        if self.refresh_count() >= self.rules.max_per_session {
            *self.state.lock() = RefreshState::Exhausted;
            return true;
        }

        false
    }

    /// Slots eligible for refresh at `now`. A slot clicked within the
    /// cool-down is excluded even when fully visible
    pub fn eligible(&self, now: Instant) -> Vec<String> {
        self.registry
            .refresh_candidates(self.rules.cooldown_after_click, now)
            .into_iter()
            .filter(|id| self.observer.is_visible(id, self.rules.viewability_threshold))
            .collect()
    }

    /// Runs one refresh pass, returning how many slots were refreshed
    pub async fn tick(&self, now: Instant) -> u32 {
        if self.state() == RefreshState::Exhausted || self.exhausted() {
            return 0;
        }

        self.set_state(RefreshState::Executing);

        let mut refreshed = 0;
        for slot_id in self.eligible(now) {
            if self.exhausted() {
                info!("Max ad refreshes reached for this session");
                break;
            }

            debug!("Refreshing ad slot {}", slot_id);
            if self.refresher.refresh(&slot_id).await {
                self.refreshes.fetch_add(1, Ordering::AcqRel);
                refreshed += 1;
            }
        }

        if !self.exhausted() {
            self.set_state(RefreshState::Idle);
        }

        refreshed
    }

    /// Tick loop, returns once the cap is reached or on [`Self::stop`]
    pub async fn run(self: Arc<Self>) {
        if !self.rules.enabled {
            debug!("Ad refresh disabled");
            return;
        }

        let start = Instant::now() + self.rules.interval;
        let mut interval = tokio::time::interval_at(start, self.rules.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            self.set_state(RefreshState::Scheduled);

            tokio::select! {
                _ = interval.tick() => {
                    let span = sample_or_attach_root_span!(self.span_sample_rate, "refresh_tick");
                    let refreshed = self.tick(Instant::now()).instrument(span).await;

                    if refreshed > 0 {
                        debug!("Refresh tick refreshed {} slots", refreshed);
                    }

                    if self.state() == RefreshState::Exhausted {
                        break;
                    }
                },
                _ = self.shutdown.notified() => {
                    self.set_state(RefreshState::Idle);
                    break;
                },
            }
        }
    }

    pub fn stop(&self) {
        self.shutdown.notify_one();
    }
}
