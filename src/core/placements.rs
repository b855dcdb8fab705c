use crate::core::analytics::{self, AnalyticsEvent};
use crate::core::models::{BestPlacement, OptimalPlacements, SlotSize};
use crate::core::storage::{self, KeyValueStore, keys};
use chrono::Utc;
use dashmap::DashMap;
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub position: &'static str,
    pub size: SlotSize,
}

/// Candidate positions trialled by the optimizer, in trial order
pub const PLACEMENTS: [Placement; 5] = [
    Placement { position: "top", size: SlotSize::Leaderboard },
    Placement { position: "mid-content", size: SlotSize::Rectangle },
    Placement { position: "sidebar", size: SlotSize::Skyscraper },
    Placement { position: "between-games", size: SlotSize::Rectangle },
    Placement { position: "bottom", size: SlotSize::Leaderboard },
];

impl Placement {
    /// Slot id of the trial unit inserted for this placement
    pub fn slot_id(&self) -> String {
        format!("test-ad-{}", self.position)
    }
}

/// True for slot ids belonging to a trial unit rather than a page slot
pub fn is_trial_unit(slot_id: &str) -> bool {
    PLACEMENTS.iter().any(|p| p.slot_id() == slot_id)
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TrialResult {
    pub impressions: u32,
    pub clicks: u32,
    /// Click through rate in percent, 0 without impressions
    pub ctr: f64,
}

#[derive(Debug, Default)]
struct Trial {
    test_id: u32,
    impressions: u32,
    clicks: u32,
}

/// Runs placement trials and keeps the best click through rate in storage
pub struct PlacementOptimizer {
    store: Arc<dyn KeyValueStore>,
    /// Running trials keyed by their unit slot id
    trials: DashMap<String, Trial>,
    results: DashMap<u32, TrialResult>,
}

impl PlacementOptimizer {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        PlacementOptimizer {
            store,
            trials: DashMap::new(),
            results: DashMap::new(),
        }
    }

    pub fn begin(&self, test_id: u32, placement: &Placement) -> String {
        info!("Testing ad placement: {}", placement.position);

        let slot_id = placement.slot_id();
        self.trials.insert(
            slot_id.clone(),
            Trial {
                test_id,
                ..Default::default()
            },
        );
        slot_id
    }

    pub fn is_trial(&self, slot_id: &str) -> bool {
        self.trials.contains_key(slot_id)
    }

    pub fn record_impression(&self, slot_id: &str) -> bool {
        self.trials
            .get_mut(slot_id)
            .map(|mut trial| trial.impressions += 1)
            .is_some()
    }

    pub fn record_click(&self, slot_id: &str) -> bool {
        self.trials
            .get_mut(slot_id)
            .map(|mut trial| trial.clicks += 1)
            .is_some()
    }

    /// Ends the trial for `slot_id`, storing it as best when its CTR beats the stored best
    pub fn conclude(&self, slot_id: &str) -> Option<TrialResult> {
        let (_, trial) = self.trials.remove(slot_id)?;

        let ctr = if trial.impressions == 0 {
            0.0
        } else {
            trial.clicks as f64 / trial.impressions as f64 * 100.0
        };

        let result = TrialResult {
            impressions: trial.impressions,
            clicks: trial.clicks,
            ctr,
        };

        info!("Placement test {} results: {:?}", trial.test_id, result);
        analytics::emit(&AnalyticsEvent::PlacementResult {
            test_id: trial.test_id,
            ctr,
        });

        self.results.insert(trial.test_id, result);
        self.save_if_best(trial.test_id, ctr);

        Some(result)
    }

    pub fn result(&self, test_id: u32) -> Option<TrialResult> {
        self.results.get(&test_id).map(|r| *r)
    }

    pub fn best(&self) -> Option<BestPlacement> {
        storage::load_or_default::<OptimalPlacements>(self.store.as_ref(), keys::OPTIMAL_PLACEMENTS)
            .best
    }

    fn save_if_best(&self, test_id: u32, ctr: f64) -> bool {
        let mut placements: OptimalPlacements =
            storage::load_or_default(self.store.as_ref(), keys::OPTIMAL_PLACEMENTS);

        if placements.best.as_ref().is_some_and(|best| ctr <= best.ctr) {
            return false;
        }

        let best = BestPlacement {
            test_id,
            ctr,
            timestamp: Utc::now().timestamp_millis(),
        };
        info!("Applying optimal ad placement: {:?}", best);

        placements.best = Some(best);
        storage::save_logged(self.store.as_ref(), keys::OPTIMAL_PLACEMENTS, &placements)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::storage::MemoryStore;

    fn run_trial(optimizer: &PlacementOptimizer, test_id: u32, impressions: u32, clicks: u32) -> TrialResult {
        let slot = optimizer.begin(test_id, &PLACEMENTS[test_id as usize]);
        for _ in 0..impressions {
            optimizer.record_impression(&slot);
        }
        for _ in 0..clicks {
            optimizer.record_click(&slot);
        }
        optimizer.conclude(&slot).unwrap()
    }

    #[test]
    fn test_ctr_in_percent() {
        let optimizer = PlacementOptimizer::new(Arc::new(MemoryStore::new()));
        let result = run_trial(&optimizer, 0, 4, 1);
        assert_eq!(result.ctr, 25.0);
        assert_eq!(optimizer.result(0), Some(result));
        assert!(!optimizer.is_trial("test-ad-top"));
    }

    #[test]
    fn test_no_impressions_scores_zero() {
        let optimizer = PlacementOptimizer::new(Arc::new(MemoryStore::new()));
        assert_eq!(run_trial(&optimizer, 1, 0, 2).ctr, 0.0);
    }

    #[test]
    fn test_best_only_replaced_by_higher_ctr() {
        let store = Arc::new(MemoryStore::new());
        let optimizer = PlacementOptimizer::new(store.clone());

        run_trial(&optimizer, 0, 64, 2);
        assert_eq!(optimizer.best().unwrap().test_id, 0);

        run_trial(&optimizer, 1, 64, 1);
        assert_eq!(optimizer.best().unwrap().test_id, 0);

        run_trial(&optimizer, 2, 64, 5);
        let best = optimizer.best().unwrap();
        assert_eq!(best.test_id, 2);
        assert_eq!(best.ctr, 7.8125);

        // a fresh optimizer over the same storage keeps the stored best
        let reopened = PlacementOptimizer::new(store);
        run_trial(&reopened, 3, 64, 4);
        assert_eq!(reopened.best().unwrap().test_id, 2);
    }

    #[test]
    fn test_events_for_unknown_units_are_ignored() {
        let optimizer = PlacementOptimizer::new(Arc::new(MemoryStore::new()));
        assert!(!optimizer.record_impression("test-ad-top"));
        assert!(!optimizer.record_click("test-ad-top"));
        assert!(optimizer.conclude("test-ad-top").is_none());
    }
}
