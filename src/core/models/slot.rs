use crate::core::models::network::NetworkId;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use tokio::time::Instant;

/// Standard ad unit size classes a container can declare
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, EnumString, Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SlotSize {
    Leaderboard,
    Rectangle,
    Skyscraper,
    #[default]
    Auto,
}

impl SlotSize {
    /// Pixel dimensions as `WxH`, or `auto` for responsive units
    pub fn dimensions(&self) -> &'static str {
        match self {
            SlotSize::Leaderboard => "728x90",
            SlotSize::Rectangle => "300x250",
            SlotSize::Skyscraper => "160x600",
            SlotSize::Auto => "auto",
        }
    }

    /// The orientation hint handed to responsive ad tags
    pub fn ad_format(&self) -> &'static str {
        match self {
            SlotSize::Leaderboard => "horizontal",
            SlotSize::Rectangle => "rectangle",
            SlotSize::Skyscraper => "vertical",
            SlotSize::Auto => "auto",
        }
    }
}

/// A container the host page exposes as an ad slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotDeclaration {
    pub id: String,
    #[serde(default)]
    pub size: SlotSize,
}

impl SlotDeclaration {
    pub fn new(id: impl Into<String>, size: SlotSize) -> Self {
        SlotDeclaration {
            id: id.into(),
            size,
        }
    }
}

/// Live state of one discovered slot for the current page view
#[derive(Debug, Clone)]
pub struct AdSlot {
    pub id: String,
    pub size: SlotSize,
    pub loaded: bool,
    /// Network that served the current content, `None` for fallback
    pub network: Option<NetworkId>,
    pub impressions: u32,
    pub clicks: u32,
    pub loaded_at: Option<Instant>,
    pub last_click_at: Option<Instant>,
    pub last_refresh_at: Option<Instant>,
    /// Set once the first qualifying impression of this page view fired
    pub impression_tracked: bool,
}

impl AdSlot {
    pub fn new(declaration: &SlotDeclaration) -> Self {
        AdSlot {
            id: declaration.id.clone(),
            size: declaration.size,
            loaded: false,
            network: None,
            impressions: 0,
            clicks: 0,
            loaded_at: None,
            last_click_at: None,
            last_refresh_at: None,
            impression_tracked: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_size_parses_lowercase_names() {
        assert_eq!(SlotSize::from_str("leaderboard").unwrap(), SlotSize::Leaderboard);
        assert_eq!(SlotSize::from_str("skyscraper").unwrap(), SlotSize::Skyscraper);
        assert!(SlotSize::from_str("billboard").is_err());
        assert_eq!(SlotSize::Rectangle.to_string(), "rectangle");
    }

    #[test]
    fn test_size_dimensions_and_format() {
        assert_eq!(SlotSize::Leaderboard.dimensions(), "728x90");
        assert_eq!(SlotSize::Rectangle.ad_format(), "rectangle");
        assert_eq!(SlotSize::Skyscraper.ad_format(), "vertical");
        assert_eq!(SlotSize::Auto.dimensions(), "auto");
    }
}
