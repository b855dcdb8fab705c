use opentelemetry::metrics::Counter;
use opentelemetry::{KeyValue, global};
use std::sync::LazyLock;
use tracing::debug;

static AD_EVENTS: LazyLock<Counter<u64>> = LazyLock::new(|| {
    global::meter("adslot")
        .u64_counter("ad_events")
        .with_description("Ad slot lifecycle and monetization events")
        .with_unit("1")
        .build()
});

/// Events reported to the analytics sink
#[derive(Debug, Clone, PartialEq)]
pub enum AnalyticsEvent<'a> {
    AdLoad { slot: &'a str, source: &'a str },
    AdImpression { slot: &'a str },
    AdClick { slot: &'a str, source: &'a str },
    Donation { amount: u32 },
    PremiumSubscribe { plan: &'a str },
    PlacementResult { test_id: u32, ctr: f64 },
}

impl AnalyticsEvent<'_> {
    pub fn name(&self) -> &'static str {
        match self {
            AnalyticsEvent::AdLoad { .. } => "ad_load",
            AnalyticsEvent::AdImpression { .. } => "ad_impression",
            AnalyticsEvent::AdClick { .. } => "ad_click",
            AnalyticsEvent::Donation { .. } => "donation",
            AnalyticsEvent::PremiumSubscribe { .. } => "premium_subscribe",
            AnalyticsEvent::PlacementResult { .. } => "placement_result",
        }
    }

    fn attributes(&self) -> Vec<KeyValue> {
        let mut attrs = vec![KeyValue::new("event", self.name())];

        match self {
            AnalyticsEvent::AdLoad { slot, source } | AnalyticsEvent::AdClick { slot, source } => {
                attrs.push(KeyValue::new("slot", slot.to_string()));
                attrs.push(KeyValue::new("source", source.to_string()));
            }
            AnalyticsEvent::AdImpression { slot } => {
                attrs.push(KeyValue::new("slot", slot.to_string()));
            }
            AnalyticsEvent::Donation { amount } => {
                attrs.push(KeyValue::new("amount", *amount as i64));
            }
            AnalyticsEvent::PremiumSubscribe { plan } => {
                attrs.push(KeyValue::new("plan", plan.to_string()));
            }
            AnalyticsEvent::PlacementResult { test_id, .. } => {
                attrs.push(KeyValue::new("test_id", *test_id as i64));
            }
        }

        attrs
    }
}

/// Records the event on the global meter and in the debug log
pub fn emit(event: &AnalyticsEvent<'_>) {
    AD_EVENTS.add(1, &event.attributes());
    debug!(event = event.name(), "Ad analytics: {:?}", event);
}
