use crate::core::models::RevenueMetrics;
use crate::core::storage::{self, KeyValueStore, keys};
use std::fmt;

/// Visitors assumed when no daily count has been recorded
pub const DEFAULT_DAILY_VISITORS: u64 = 10_000;

const AD_CTR: f64 = 0.005;
const AD_CPC: f64 = 0.15;
const AFFILIATE_REACH: f64 = 0.1;
const AFFILIATE_CONVERSION: f64 = 0.01;
const AFFILIATE_COMMISSION: f64 = 20.0;
const PREMIUM_CONVERSION: f64 = 0.002;
const PREMIUM_PRICE: f64 = 5.0;

/// Daily dollars per revenue stream
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RevenueBreakdown {
    pub ads: f64,
    pub affiliate: f64,
    pub premium: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RevenueProjection {
    pub daily: f64,
    pub monthly: f64,
    pub yearly: f64,
    pub breakdown: RevenueBreakdown,
}

impl fmt::Display for RevenueProjection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "daily ${:.2} monthly ${:.2} yearly ${:.2} (ads ${:.2}, affiliate ${:.2}, premium ${:.2})",
            self.daily,
            self.monthly,
            self.yearly,
            self.breakdown.ads,
            self.breakdown.affiliate,
            self.breakdown.premium,
        )
    }
}

/// Estimated earnings from the daily visitor count. Months are 30 days
pub fn project(metrics: &RevenueMetrics) -> RevenueProjection {
    let visitors = match metrics.daily_visitors {
        0 => DEFAULT_DAILY_VISITORS,
        n => n,
    } as f64;

    let breakdown = RevenueBreakdown {
        ads: visitors * AD_CTR * AD_CPC,
        affiliate: visitors * AFFILIATE_REACH * AFFILIATE_CONVERSION * AFFILIATE_COMMISSION,
        premium: visitors * PREMIUM_CONVERSION * PREMIUM_PRICE,
    };

    let daily = breakdown.ads + breakdown.affiliate + breakdown.premium;
    let monthly = daily * 30.0;

    RevenueProjection {
        daily,
        monthly,
        yearly: monthly * 12.0,
        breakdown,
    }
}

pub fn load_metrics(store: &dyn KeyValueStore) -> RevenueMetrics {
    storage::load_or_default(store, keys::REVENUE_METRICS)
}

pub fn save_metrics(store: &dyn KeyValueStore, metrics: &RevenueMetrics) -> bool {
    storage::save_logged(store, keys::REVENUE_METRICS, metrics)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::storage::MemoryStore;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn test_unknown_visitors_use_default_audience() {
        let projection = project(&RevenueMetrics::default());

        assert!(close(projection.breakdown.ads, 7.5));
        assert!(close(projection.breakdown.affiliate, 200.0));
        assert!(close(projection.breakdown.premium, 100.0));
        assert!(close(projection.daily, 307.5));
        assert!(close(projection.monthly, 9225.0));
        assert!(close(projection.yearly, 110_700.0));
    }

    #[test]
    fn test_projection_scales_with_visitors() {
        let metrics = RevenueMetrics {
            daily_visitors: 1000,
            ..Default::default()
        };
        let projection = project(&metrics);

        assert!(close(projection.daily, 30.75));
        assert_eq!(
            projection.to_string(),
            "daily $30.75 monthly $922.50 yearly $11070.00 (ads $0.75, affiliate $20.00, premium $10.00)"
        );
    }

    #[test]
    fn test_metrics_are_independent_of_other_namespaces() {
        let store = MemoryStore::new();
        store
            .set(keys::AD_REVENUE, r#"{"total": 4.0}"#.to_string())
            .unwrap();
        assert_eq!(load_metrics(&store), RevenueMetrics::default());

        store
            .set(keys::REVENUE_METRICS, r#"{"dailyVisitors": 400}"#.to_string())
            .unwrap();
        let mut metrics = load_metrics(&store);
        assert_eq!(metrics.daily_visitors, 400);

        metrics.affiliate_revenue = 20.0;
        assert!(save_metrics(&store, &metrics));
        assert_eq!(load_metrics(&store), metrics);
        assert_eq!(store.get(keys::AD_REVENUE).unwrap().unwrap(), r#"{"total": 4.0}"#);
    }
}
