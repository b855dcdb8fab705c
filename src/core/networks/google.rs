use crate::core::markup::escape;
use crate::core::models::{NetworkConfig, SlotSize};
use crate::core::networks::NetworkRenderer;

/// Responsive adsbygoogle unit
pub struct GoogleRenderer;

impl NetworkRenderer for GoogleRenderer {
    fn markup(&self, config: &NetworkConfig, _slot_id: &str, size: SlotSize) -> String {
        let unit = config.unit_for(size).unwrap_or("auto");

        format!(
            r#"<ins class="adsbygoogle" style="display:block;" data-ad-client="{client}" data-ad-slot="{unit}" data-ad-format="{format}" data-full-width-responsive="true"></ins><script>(adsbygoogle = window.adsbygoogle || []).push({{}});</script>"#,
            client = escape(&config.publisher_id),
            unit = escape(unit),
            format = size.ad_format(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::NetworkConfigBuilder;
    use std::collections::HashMap;

    #[test]
    fn test_markup_uses_sized_unit_or_auto() {
        let config = NetworkConfigBuilder::default()
            .id("google")
            .enabled(true)
            .publisher_id("ca-pub-1")
            .slots(HashMap::from([("rectangle".to_string(), "0987654321".to_string())]))
            .build()
            .unwrap();

        let rect = GoogleRenderer.markup(&config, "sidebar", SlotSize::Rectangle);
        assert!(rect.contains(r#"data-ad-client="ca-pub-1""#));
        assert!(rect.contains(r#"data-ad-slot="0987654321""#));
        assert!(rect.contains(r#"data-ad-format="rectangle""#));

        let sky = GoogleRenderer.markup(&config, "sidebar", SlotSize::Skyscraper);
        assert!(sky.contains(r#"data-ad-slot="auto""#));
        assert!(sky.contains(r#"data-ad-format="vertical""#));
    }
}
