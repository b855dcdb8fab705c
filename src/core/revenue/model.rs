use crate::app::config::{RevenueConfig, ValueRange};
use rand::Rng;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevenueEvent {
    Impression,
    Click,
}

/// Source of the dollar value credited for an event. The simulated model
/// stands in until real network reporting data is wired in
pub trait RevenueModel: Send + Sync {
    fn value(&self, event: RevenueEvent, slot_id: &str) -> f64;
}

/// Uniform random draw from a configured range per event kind.
/// Cosmetic only, this is not billing data
pub struct SimulatedRevenue {
    impression: ValueRange,
    click: ValueRange,
}

impl SimulatedRevenue {
    pub fn new(config: &RevenueConfig) -> Self {
        SimulatedRevenue {
            impression: config.impression,
            click: config.click,
        }
    }

    pub fn range(&self, event: RevenueEvent) -> ValueRange {
        match event {
            RevenueEvent::Impression => self.impression,
            RevenueEvent::Click => self.click,
        }
    }
}

fn draw(range: ValueRange) -> f64 {
    if range.max <= range.min {
        return range.min.max(0.0);
    }

    rand::rng().random_range(range.min..=range.max)
}

impl RevenueModel for SimulatedRevenue {
    fn value(&self, event: RevenueEvent, _slot_id: &str) -> f64 {
        draw(self.range(event))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draws_stay_within_configured_ranges() {
        let config = RevenueConfig::default();
        let model = SimulatedRevenue::new(&config);

        assert_eq!(model.range(RevenueEvent::Click), ValueRange::new(0.05, 0.20));
        assert_eq!(model.range(RevenueEvent::Impression), ValueRange::new(0.001, 0.006));

        for _ in 0..500 {
            let click = model.value(RevenueEvent::Click, "a");
            let imp = model.value(RevenueEvent::Impression, "a");
            assert!(config.click.contains(click), "click {click}");
            assert!(config.impression.contains(imp), "impression {imp}");
        }
    }

    #[test]
    fn test_degenerate_range_returns_min() {
        let model = SimulatedRevenue::new(&RevenueConfig {
            impression: ValueRange::new(0.002, 0.002),
            click: ValueRange::new(0.1, 0.1),
        });

        assert_eq!(model.value(RevenueEvent::Impression, "a"), 0.002);
        assert_eq!(model.value(RevenueEvent::Click, "a"), 0.1);
    }
}
