use crate::app::config::PageRevenueConfig;
use crate::core::host::AdHost;
use crate::core::models::PageRevenue;
use crate::core::storage::{self, KeyValueStore, keys};
use parking_lot::Mutex;
use rand::Rng;
use std::sync::Arc;
use tracing::debug;

/// Page level earnings estimate kept under its own storage key, independent
/// of the per event ad revenue totals
pub struct PageRevenueMirror {
    config: PageRevenueConfig,
    state: Mutex<PageRevenue>,
    store: Arc<dyn KeyValueStore>,
}

impl PageRevenueMirror {
    pub fn new(config: PageRevenueConfig, store: Arc<dyn KeyValueStore>) -> Self {
        let state: PageRevenue = storage::load_or_default(store.as_ref(), keys::PAGE_REVENUE);

        PageRevenueMirror {
            config,
            state: Mutex::new(state),
            store,
        }
    }

    pub fn state(&self) -> PageRevenue {
        self.state.lock().clone()
    }

    /// Adds `amount` to today and total, then persists
    pub fn add(&self, amount: f64) -> PageRevenue {
        let amount = if amount.is_finite() { amount.max(0.0) } else { 0.0 };

        let mut state = self.state.lock();
        state.today += amount;
        state.total += amount;
        storage::save_logged(self.store.as_ref(), keys::PAGE_REVENUE, &*state);

        state.clone()
    }

    /// One simulated update in `[0, max_increment)`
    pub fn update(&self) -> PageRevenue {
        let amount = if self.config.max_increment > 0.0 {
            rand::rng().random_range(0.0..self.config.max_increment)
        } else {
            0.0
        };

        let state = self.add(amount);
        debug!("Page revenue today ${:.2} total ${:.2}", state.today, state.total);
        state
    }

    /// Updates every `interval` and refreshes the host readout, until aborted
    pub async fn run(self: Arc<Self>, host: Arc<dyn AdHost>) {
        if !self.config.enabled || self.config.interval.is_zero() {
            return;
        }

        let start = tokio::time::Instant::now() + self.config.interval;
        let mut interval = tokio::time::interval_at(start, self.config.interval);

        loop {
            interval.tick().await;
            let state = self.update();
            host.page_revenue_display(state.today, state.total);
        }
    }
}
