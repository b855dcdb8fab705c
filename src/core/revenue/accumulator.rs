use crate::core::models::RevenueState;
use crate::core::revenue::{RevenueEvent, RevenueModel};
use crate::core::storage::{self, KeyValueStore, keys};
use chrono::Utc;
use dashmap::DashMap;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::debug;

/// Running simulated revenue totals. Every mutation is persisted before the
/// state lock is released, so each event is applied and saved as one unit
pub struct RevenueAccumulator {
    state: Mutex<RevenueState>,
    per_slot: DashMap<String, f64>,
    model: Arc<dyn RevenueModel>,
    store: Arc<dyn KeyValueStore>,
}

impl RevenueAccumulator {
    pub fn new(model: Arc<dyn RevenueModel>, store: Arc<dyn KeyValueStore>) -> Self {
        RevenueAccumulator {
            state: Mutex::new(RevenueState::default()),
            per_slot: DashMap::new(),
            model,
            store,
        }
    }

    /// Merges the persisted totals over the fresh in-memory defaults
    pub fn load(&self) -> RevenueState {
        let persisted: RevenueState = storage::load_or_default(self.store.as_ref(), keys::AD_REVENUE);
        debug!(
            "Loaded revenue ${:.2}, {} loaded, {} clicked",
            persisted.total_revenue, persisted.ads_loaded, persisted.ads_clicked
        );

        let mut state = self.state.lock();
        *state = persisted;
        state.clone()
    }

    pub fn state(&self) -> RevenueState {
        self.state.lock().clone()
    }

    pub fn slot_revenue(&self, slot_id: &str) -> f64 {
        self.per_slot.get(slot_id).map(|v| *v).unwrap_or(0.0)
    }

    fn persist(&self, state: &mut RevenueState) {
        state.last_updated = Utc::now().timestamp_millis();
        storage::save_logged(self.store.as_ref(), keys::AD_REVENUE, &*state);
    }

    pub fn record_load(&self, _slot_id: &str) {
        let mut state = self.state.lock();
        state.ads_loaded += 1;
        self.persist(&mut state);
    }

    /// Credits one impression, returns the new total
    pub fn record_impression(&self, slot_id: &str) -> f64 {
        self.credit(slot_id, RevenueEvent::Impression)
    }

    /// Credits one click, returns the new total
    pub fn record_click(&self, slot_id: &str) -> f64 {
        self.credit(slot_id, RevenueEvent::Click)
    }

    fn credit(&self, slot_id: &str, event: RevenueEvent) -> f64 {
        let value = self.model.value(event, slot_id);
        // a model can never lower the total
        let value = if value.is_finite() { value.max(0.0) } else { 0.0 };

        let mut state = self.state.lock();
        state.total_revenue += value;
        if event == RevenueEvent::Click {
            state.ads_clicked += 1;
        }

        *self.per_slot.entry(slot_id.to_string()).or_insert(0.0) += value;

        self.persist(&mut state);
        state.total_revenue
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::config::RevenueConfig;
    use crate::core::revenue::SimulatedRevenue;
    use crate::core::storage::MemoryStore;
    use anyhow::{Error, bail};

    struct Fixed(f64);

    impl RevenueModel for Fixed {
        fn value(&self, _event: RevenueEvent, _slot_id: &str) -> f64 {
            self.0
        }
    }

    struct ReadOnlyStore;

    impl KeyValueStore for ReadOnlyStore {
        fn get(&self, _key: &str) -> Result<Option<String>, Error> {
            Ok(None)
        }

        fn set(&self, _key: &str, _value: String) -> Result<(), Error> {
            bail!("storage is read only")
        }
    }

    fn persisted(store: &MemoryStore) -> RevenueState {
        storage::load_or_default(store, keys::AD_REVENUE)
    }

    #[test]
    fn test_every_event_is_persisted() {
        let store = Arc::new(MemoryStore::new());
        let acc = RevenueAccumulator::new(Arc::new(Fixed(0.1)), store.clone());

        acc.record_load("a");
        assert_eq!(persisted(&store).ads_loaded, 1);

        acc.record_click("a");
        let saved = persisted(&store);
        assert_eq!(saved.ads_clicked, 1);
        assert!((saved.total_revenue - 0.1).abs() < 1e-9);
        assert!(saved.last_updated > 0);
    }

    #[test]
    fn test_total_never_decreases() {
        let store = Arc::new(MemoryStore::new());
        let acc = RevenueAccumulator::new(
            Arc::new(SimulatedRevenue::new(&RevenueConfig::default())),
            store,
        );

        let mut last = 0.0;
        for i in 0..200 {
            let total = if i % 3 == 0 {
                acc.record_click("a")
            } else {
                acc.record_impression("b")
            };
            assert!(total >= last);
            last = total;
        }
    }

    #[test]
    fn test_negative_model_values_are_ignored() {
        let acc = RevenueAccumulator::new(Arc::new(Fixed(-5.0)), Arc::new(MemoryStore::new()));
        assert_eq!(acc.record_impression("a"), 0.0);
        assert_eq!(acc.record_click("a"), 0.0);
    }

    #[test]
    fn test_load_merges_persisted_over_defaults() {
        let store = Arc::new(MemoryStore::new());
        store
            .set(keys::AD_REVENUE, r#"{"total": 3.5, "adsClicked": 4}"#.to_string())
            .unwrap();

        let acc = RevenueAccumulator::new(Arc::new(Fixed(0.5)), store);
        let loaded = acc.load();
        assert_eq!(loaded.total_revenue, 3.5);
        assert_eq!(loaded.ads_clicked, 4);
        assert_eq!(loaded.ads_loaded, 0);

        assert_eq!(acc.record_click("a"), 4.0);
        assert_eq!(acc.state().ads_clicked, 5);
    }

    #[test]
    fn test_persist_failure_keeps_memory_state() {
        let acc = RevenueAccumulator::new(Arc::new(Fixed(0.25)), Arc::new(ReadOnlyStore));
        acc.record_impression("a");
        acc.record_impression("a");

        assert_eq!(acc.state().total_revenue, 0.5);
        assert_eq!(acc.slot_revenue("a"), 0.5);
        assert_eq!(acc.slot_revenue("b"), 0.0);
    }
}
