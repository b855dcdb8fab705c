use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Advisory overlays shown by the alternative monetization flow
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display,
    EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PanelKind {
    AdBlockNotice,
    WhitelistInstructions,
    Donation,
    DonationThanks,
    Premium,
    PremiumPlans,
    AffiliateOffers,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Panel {
    pub kind: PanelKind,
    pub markup: String,
}

/// Subscription plans offered by the premium panel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PremiumPlan {
    Monthly,
    Yearly,
}

/// User interactions the panels accept
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PanelAction {
    Dismiss(PanelKind),
    /// "Whitelist This Site" on the notice
    Whitelist,
    /// "I've Whitelisted the Site" on the instructions
    ConfirmWhitelisted,
    Donate(u32),
    UpgradePremium,
    Subscribe(PremiumPlan),
}
