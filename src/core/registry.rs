use crate::core::models::{AdSlot, NetworkId, SlotDeclaration};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::time::Duration;
use tokio::time::Instant;

/// In-memory slot state for the current page view. Each mutation runs
/// under the entry lock so counters for a slot never interleave
#[derive(Default)]
pub struct SlotRegistry {
    slots: DashMap<String, AdSlot>,
}

impl SlotRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the slot if it is not known yet, returns true when added
    pub fn discover(&self, declaration: &SlotDeclaration) -> bool {
        match self.slots.entry(declaration.id.clone()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(vacant) => {
                vacant.insert(AdSlot::new(declaration));
                true
            }
        }
    }

    pub fn remove(&self, slot_id: &str) -> Option<AdSlot> {
        self.slots.remove(slot_id).map(|(_, slot)| slot)
    }

    pub fn get(&self, slot_id: &str) -> Option<AdSlot> {
        self.slots.get(slot_id).map(|slot| slot.clone())
    }

    pub fn contains(&self, slot_id: &str) -> bool {
        self.slots.contains_key(slot_id)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.slots.iter().map(|e| e.key().clone()).collect();
        ids.sort();
        ids
    }

    /// Number of slots currently showing loaded content
    pub fn loaded_count(&self) -> usize {
        self.slots.iter().filter(|e| e.loaded).count()
    }

    /// Marks content as loaded, stamping `last_refresh_at` when it replaced earlier content
    pub fn record_load(
        &self,
        slot_id: &str,
        network: Option<NetworkId>,
        refreshed: bool,
        now: Instant,
    ) -> bool {
        let Some(mut slot) = self.slots.get_mut(slot_id) else {
            return false;
        };

        slot.loaded = true;
        slot.network = network;
        slot.loaded_at = Some(now);
        if refreshed {
            slot.last_refresh_at = Some(now);
        }

        true
    }

    /// Counts a click, returns the serving network label when the slot exists
    pub fn record_click(&self, slot_id: &str, now: Instant) -> Option<Option<NetworkId>> {
        let mut slot = self.slots.get_mut(slot_id)?;

        slot.clicks += 1;
        slot.last_click_at = Some(now);

        Some(slot.network.clone())
    }

    /// Counts the single impression allowed per page view. Returns true only
    /// for the first call on a loaded slot, later calls are no-ops
    pub fn mark_impression(&self, slot_id: &str) -> bool {
        let Some(mut slot) = self.slots.get_mut(slot_id) else {
            return false;
        };

        if !slot.loaded || slot.impression_tracked {
            return false;
        }

        slot.impression_tracked = true;
        slot.impressions += 1;
        true
    }

    /// Loaded slots outside the post click cool-down window
    pub fn refresh_candidates(&self, cooldown: Duration, now: Instant) -> Vec<String> {
        let mut ids: Vec<String> = self
            .slots
            .iter()
            .filter(|e| e.loaded && cooled_down(e.value(), cooldown, now))
            .map(|e| e.key().clone())
            .collect();
        ids.sort();
        ids
    }
}

pub fn cooled_down(slot: &AdSlot, cooldown: Duration, now: Instant) -> bool {
    match slot.last_click_at {
        None => true,
        Some(clicked) => now.saturating_duration_since(clicked) >= cooldown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::SlotSize;

    fn registry_with(ids: &[&str]) -> SlotRegistry {
        let registry = SlotRegistry::new();
        for id in ids {
            registry.discover(&SlotDeclaration::new(*id, SlotSize::Rectangle));
        }
        registry
    }

    #[test]
    fn test_discover_is_incremental() {
        let registry = registry_with(&["a"]);
        assert!(!registry.discover(&SlotDeclaration::new("a", SlotSize::Auto)));
        assert!(registry.discover(&SlotDeclaration::new("b", SlotSize::Auto)));
        assert_eq!(registry.ids(), vec!["a", "b"]);
        // rediscovery keeps the original declaration
        assert_eq!(registry.get("a").unwrap().size, SlotSize::Rectangle);
    }

    #[test]
    fn test_concurrent_discover_adds_once() {
        let registry = SlotRegistry::new();
        let declaration = SlotDeclaration::new("shared", SlotSize::Rectangle);

        let added: usize = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|_| scope.spawn(|| registry.discover(&declaration)))
                .collect();
            handles
                .into_iter()
                .map(|h| h.join().unwrap() as usize)
                .sum()
        });

        assert_eq!(added, 1);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_impression_gated_once_per_page_view() {
        let registry = registry_with(&["a"]);
        assert!(!registry.mark_impression("a"), "unloaded slot cannot count");

        registry.record_load("a", Some(NetworkId::new("google")), false, Instant::now());
        assert!(registry.mark_impression("a"));
        assert!(!registry.mark_impression("a"));
        assert_eq!(registry.get("a").unwrap().impressions, 1);
    }

    #[test]
    fn test_click_cooldown_excludes_from_candidates() {
        let registry = registry_with(&["a", "b"]);
        let t0 = Instant::now();
        let cooldown = Duration::from_secs(60);

        registry.record_load("a", None, false, t0);
        registry.record_load("b", None, false, t0);
        registry.record_click("a", t0);

        let at_30s = t0 + Duration::from_secs(30);
        assert_eq!(registry.refresh_candidates(cooldown, at_30s), vec!["b"]);

        let at_61s = t0 + Duration::from_secs(61);
        assert_eq!(registry.refresh_candidates(cooldown, at_61s), vec!["a", "b"]);
    }

    #[test]
    fn test_refresh_load_stamps_refresh_time() {
        let registry = registry_with(&["a"]);
        let t0 = Instant::now();

        registry.record_load("a", None, false, t0);
        assert!(registry.get("a").unwrap().last_refresh_at.is_none());

        let t1 = t0 + Duration::from_secs(30);
        registry.record_load("a", Some(NetworkId::new("google")), true, t1);
        let slot = registry.get("a").unwrap();
        assert_eq!(slot.last_refresh_at, Some(t1));
        assert_eq!(slot.network, Some(NetworkId::new("google")));
    }

    #[test]
    fn test_unknown_slot_operations_are_noops() {
        let registry = SlotRegistry::new();
        assert!(!registry.record_load("missing", None, false, Instant::now()));
        assert!(registry.record_click("missing", Instant::now()).is_none());
        assert!(!registry.mark_impression("missing"));
        assert_eq!(registry.loaded_count(), 0);
    }
}
