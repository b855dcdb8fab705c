use serde::{Deserialize, Serialize};

/// Simulated ad revenue totals persisted under `adRevenue`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RevenueState {
    #[serde(rename = "total")]
    pub total_revenue: f64,
    pub ads_loaded: u64,
    pub ads_clicked: u64,
    /// Unix epoch millis of the last mutation
    pub last_updated: i64,
}

/// Page level estimate persisted under `carGamesRevenue`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageRevenue {
    pub today: f64,
    pub monthly: f64,
    pub total: f64,
}

/// Revenue optimizer metrics persisted under `revenueMetrics`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RevenueMetrics {
    pub daily_visitors: u64,
    pub ad_revenue: f64,
    pub affiliate_revenue: f64,
    pub premium_revenue: f64,
    pub total_revenue: f64,
}

/// Best placement trial persisted under `optimalAdPlacements`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BestPlacement {
    pub test_id: u32,
    pub ctr: f64,
    pub timestamp: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimalPlacements {
    pub best: Option<BestPlacement>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_revenue_state_uses_persisted_key_names() {
        let state = RevenueState {
            total_revenue: 1.5,
            ads_loaded: 3,
            ads_clicked: 1,
            last_updated: 42,
        };

        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["total"], 1.5);
        assert_eq!(json["adsLoaded"], 3);
        assert_eq!(json["adsClicked"], 1);
        assert_eq!(json["lastUpdated"], 42);
    }

    #[test]
    fn test_partial_persisted_state_keeps_defaults() {
        let state: RevenueState = serde_json::from_str(r#"{"total": 2.25}"#).unwrap();
        assert_eq!(state.total_revenue, 2.25);
        assert_eq!(state.ads_loaded, 0);
    }

    #[test]
    fn test_revenue_metrics_merge_over_defaults() {
        let metrics: RevenueMetrics =
            serde_json::from_str(r#"{"dailyVisitors": 2500, "adRevenue": 1.25}"#).unwrap();
        assert_eq!(metrics.daily_visitors, 2500);
        assert_eq!(metrics.ad_revenue, 1.25);
        assert_eq!(metrics.premium_revenue, 0.0);

        let json = serde_json::to_value(&metrics).unwrap();
        assert_eq!(json["affiliateRevenue"], 0.0);
        assert_eq!(json["totalRevenue"], 0.0);
    }

    #[test]
    fn test_optimal_placements_shape() {
        let placements: OptimalPlacements =
            serde_json::from_str(r#"{"best": {"testId": 2, "ctr": 4.5, "timestamp": 7}}"#)
                .unwrap();
        let best = placements.best.unwrap();
        assert_eq!(best.test_id, 2);
        assert_eq!(best.ctr, 4.5);
    }
}
