use crate::core::models::network::NetworkId;
use serde::{Deserialize, Serialize};

/// A product promoted in place of network ads when ads are blocked
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AffiliateOffer {
    pub title: String,
    pub description: String,
    pub image: String,
    pub link: String,
    /// Commission earned per referral, in dollars
    pub commission: u32,
}

/// What gets injected into a slot container
#[derive(Debug, Clone, PartialEq)]
pub enum ContentDescriptor {
    /// Markup for a network ad tag
    Network { network: NetworkId, markup: String },
    /// House ad shown when no network is available
    Fallback { link: String, markup: String },
    /// Affiliate offer replacing an ad slot
    Affiliate { offer: AffiliateOffer, markup: String },
    /// Placeholder unit used by placement trials
    House { markup: String },
    /// Nothing to show, fallback content is disabled
    Empty,
}

impl ContentDescriptor {
    pub fn markup(&self) -> &str {
        match self {
            ContentDescriptor::Network { markup, .. }
            | ContentDescriptor::Fallback { markup, .. }
            | ContentDescriptor::Affiliate { markup, .. }
            | ContentDescriptor::House { markup } => markup.as_str(),
            ContentDescriptor::Empty => "",
        }
    }

    /// The network which served this content, if any
    pub fn network(&self) -> Option<&NetworkId> {
        match self {
            ContentDescriptor::Network { network, .. } => Some(network),
            _ => None,
        }
    }

    /// Whether applying this content counts as an ad load
    pub fn is_ad(&self) -> bool {
        matches!(
            self,
            ContentDescriptor::Network { .. } | ContentDescriptor::Fallback { .. }
        )
    }

    /// Label reported to analytics for the serving source
    pub fn source(&self) -> &str {
        match self {
            ContentDescriptor::Network { network, .. } => network.as_str(),
            ContentDescriptor::Fallback { .. } => "fallback",
            ContentDescriptor::Affiliate { .. } => "affiliate",
            ContentDescriptor::House { .. } => "house",
            ContentDescriptor::Empty => "none",
        }
    }
}
