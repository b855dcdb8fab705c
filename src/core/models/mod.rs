pub mod content;
pub mod network;
pub mod panel;
pub mod revenue;
pub mod slot;

pub use content::{AffiliateOffer, ContentDescriptor};
pub use network::{NetworkConfig, NetworkConfigBuilder, NetworkId};
pub use panel::{Panel, PanelAction, PanelKind, PremiumPlan};
pub use revenue::{BestPlacement, OptimalPlacements, PageRevenue, RevenueMetrics, RevenueState};
pub use slot::{AdSlot, SlotDeclaration, SlotSize};
