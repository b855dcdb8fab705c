use crate::app::config::AlternativesConfig;
use crate::core::analytics::{self, AnalyticsEvent};
use crate::core::host::AdHost;
use crate::core::models::{Panel, PanelAction, PanelKind};
use crate::core::monetization::panels;
use parking_lot::Mutex;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Default)]
struct PresenterState {
    presented: bool,
    alternatives_shown: bool,
    open: BTreeSet<PanelKind>,
}

/// Advisory flow shown when ads are blocked: an explanation notice with a
/// whitelist sub-flow, then donation, premium and affiliate panels. Every
/// panel can be dismissed and none of them block the page
pub struct AlternativeMonetization {
    config: AlternativesConfig,
    host: Arc<dyn AdHost>,
    state: Mutex<PresenterState>,
}

impl AlternativeMonetization {
    pub fn new(config: AlternativesConfig, host: Arc<dyn AdHost>) -> Self {
        AlternativeMonetization {
            config,
            host,
            state: Mutex::new(PresenterState::default()),
        }
    }

    /// Shows the blocking notice. Only the first call per page load has any
    /// effect, returns whether this call presented it
    pub fn present(&self) -> bool {
        let mut state = self.state.lock();
        if state.presented {
            return false;
        }
        state.presented = true;

        warn!("Ad blocker detected, presenting alternative monetization");
        self.open(&mut state, panels::ad_block_notice(&self.config));
        true
    }

    pub fn open_panels(&self) -> Vec<PanelKind> {
        self.state.lock().open.iter().copied().collect()
    }

    pub fn is_open(&self, kind: PanelKind) -> bool {
        self.state.lock().open.contains(&kind)
    }

    fn open(&self, state: &mut PresenterState, panel: Panel) {
        state.open.insert(panel.kind);
        self.host.show_panel(&panel);
    }

    fn close(&self, state: &mut PresenterState, kind: PanelKind) {
        if state.open.remove(&kind) {
            self.host.remove_panel(kind);
        }
    }

    /// Fills the first slots with affiliate offers, one offer per slot
    fn place_offers(&self, slot_ids: &[String]) {
        for (slot_id, offer) in slot_ids.iter().zip(self.config.affiliate_offers.iter()) {
            if !self.host.apply(slot_id, &panels::affiliate_content(offer)) {
                warn!("Slot {} vanished before its affiliate offer was placed", slot_id);
            }
        }
    }

    fn show_alternatives(&self, state: &mut PresenterState) {
        if state.alternatives_shown {
            return;
        }
        state.alternatives_shown = true;

        self.open(state, panels::donation(&self.config));
        self.open(state, panels::premium(&self.config));
        self.open(state, panels::affiliate_offers(&self.config));

        let slot_ids: Vec<String> = self.host.slots().into_iter().map(|d| d.id).collect();
        self.place_offers(&slot_ids);
    }

    /// Applies one user interaction with the panels. Actions on panels that
    /// are not open are ignored
    pub fn handle(&self, action: PanelAction) {
        let mut state = self.state.lock();

        match action {
            PanelAction::Dismiss(kind) => {
                if !state.open.contains(&kind) {
                    return;
                }
                self.close(&mut state, kind);

                if kind == PanelKind::AdBlockNotice {
                    self.close(&mut state, PanelKind::WhitelistInstructions);
                    self.show_alternatives(&mut state);
                }
            }
            PanelAction::Whitelist => {
                if state.open.contains(&PanelKind::AdBlockNotice) {
                    self.open(&mut state, panels::whitelist_instructions(&self.config));
                }
            }
            PanelAction::ConfirmWhitelisted => {
                if !state.open.contains(&PanelKind::WhitelistInstructions) {
                    return;
                }
                self.close(&mut state, PanelKind::WhitelistInstructions);

                info!("Site whitelisted, reloading to detect again");
                *state = PresenterState::default();
                drop(state);
                self.host.reload();
            }
            PanelAction::Donate(amount) => {
                if !state.open.contains(&PanelKind::Donation) {
                    return;
                }

                // no payment processing, the pledge is only recorded
                info!("Processing donation: ${}", amount);
                analytics::emit(&AnalyticsEvent::Donation { amount });
                self.open(&mut state, panels::donation_thanks(amount));
            }
            PanelAction::UpgradePremium => {
                if state.open.contains(&PanelKind::Premium) {
                    self.open(&mut state, panels::premium_plans(&self.config));
                }
            }
            PanelAction::Subscribe(plan) => {
                if !state.open.contains(&PanelKind::PremiumPlans) {
                    return;
                }

                let plan_name = plan.to_string();
                info!("Premium subscription requested: {}", plan_name);
                analytics::emit(&AnalyticsEvent::PremiumSubscribe { plan: &plan_name });
                self.close(&mut state, PanelKind::PremiumPlans);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::host::HeadlessHost;
    use crate::core::models::{ContentDescriptor, PremiumPlan, SlotDeclaration, SlotSize};

    fn presenter(slots: &[&str]) -> (Arc<HeadlessHost>, AlternativeMonetization) {
        let decls: Vec<SlotDeclaration> = slots
            .iter()
            .map(|id| SlotDeclaration::new(*id, SlotSize::Rectangle))
            .collect();
        let host = Arc::new(HeadlessHost::new(&decls));
        let presenter = AlternativeMonetization::new(AlternativesConfig::default(), host.clone());
        (host, presenter)
    }

    #[test]
    fn test_notice_presented_once() {
        let (host, presenter) = presenter(&[]);

        assert!(presenter.present());
        assert!(!presenter.present());
        assert_eq!(host.panels(), vec![PanelKind::AdBlockNotice]);
    }

    #[test]
    fn test_dismissing_notice_reveals_independent_alternatives() {
        let (host, presenter) = presenter(&["a", "b", "c"]);
        presenter.present();

        presenter.handle(PanelAction::Dismiss(PanelKind::AdBlockNotice));
        assert_eq!(
            presenter.open_panels(),
            vec![PanelKind::Donation, PanelKind::Premium, PanelKind::AffiliateOffers]
        );

        presenter.handle(PanelAction::Dismiss(PanelKind::Premium));
        assert!(presenter.is_open(PanelKind::Donation));
        assert!(presenter.is_open(PanelKind::AffiliateOffers));
        assert!(!host.panels().contains(&PanelKind::Premium));

        // two offers configured, so only the first two slots get one
        assert!(matches!(host.content("a"), Some(ContentDescriptor::Affiliate { .. })));
        assert!(matches!(host.content("b"), Some(ContentDescriptor::Affiliate { .. })));
        assert!(host.content("c").is_none());
    }

    #[test]
    fn test_whitelist_flow_ends_in_reload() {
        let (host, presenter) = presenter(&[]);
        presenter.present();

        presenter.handle(PanelAction::ConfirmWhitelisted);
        assert_eq!(host.reloads(), 0, "instructions were never opened");

        presenter.handle(PanelAction::Whitelist);
        assert!(host.panels().contains(&PanelKind::WhitelistInstructions));

        presenter.handle(PanelAction::ConfirmWhitelisted);
        assert_eq!(host.reloads(), 1);
        assert!(presenter.open_panels().is_empty());
        // the reloaded page presents from scratch
        assert!(presenter.present());
    }

    #[test]
    fn test_donation_and_premium_actions() {
        let (host, presenter) = presenter(&[]);
        presenter.handle(PanelAction::Donate(5));
        assert!(host.panel(PanelKind::DonationThanks).is_none());

        presenter.present();
        presenter.handle(PanelAction::Dismiss(PanelKind::AdBlockNotice));
        presenter.handle(PanelAction::Donate(5));
        assert!(host.panel(PanelKind::DonationThanks).unwrap().markup.contains("$5"));

        presenter.handle(PanelAction::Subscribe(PremiumPlan::Yearly));
        assert!(!presenter.is_open(PanelKind::PremiumPlans));

        presenter.handle(PanelAction::UpgradePremium);
        assert!(host.panel(PanelKind::PremiumPlans).unwrap().markup.contains("$29.99"));

        presenter.handle(PanelAction::Subscribe(PremiumPlan::Yearly));
        assert!(!presenter.is_open(PanelKind::PremiumPlans));
        assert!(presenter.is_open(PanelKind::Premium));
    }
}
