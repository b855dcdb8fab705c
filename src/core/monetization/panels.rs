use crate::app::config::AlternativesConfig;
use crate::core::markup::escape;
use crate::core::models::{AffiliateOffer, ContentDescriptor, Panel, PanelKind};

/// Blocker products with whitelist steps
const WHITELIST_STEPS: [(&str, &str); 3] = [
    (
        "uBlock Origin",
        "Click the uBlock icon, then click the power button to turn it off for this site",
    ),
    ("AdBlock Plus", "Click the ABP icon, then disable it on {domain}"),
    ("AdBlock", "Click the AdBlock icon, then choose don't run on pages on this domain"),
];

pub fn ad_block_notice(config: &AlternativesConfig) -> Panel {
    let markup = format!(
        concat!(
            r#"<div class="adblock-message"><div class="adblock-content">"#,
            r#"<div class="adblock-header"><h3>Please Disable Ad Blocker</h3></div>"#,
            r#"<div class="adblock-body"><p>{site} is free thanks to advertisements. By disabling your ad blocker, you help support:</p>"#,
            r#"<ul><li>Adding new games daily</li><li>Improving server performance</li><li>Maintaining the website</li></ul>"#,
            r#"<div class="adblock-actions"><button class="btn-adblock-whitelist">Whitelist This Site</button>"#,
            r#"<button class="btn-adblock-close">Continue Anyway</button></div></div></div></div>"#,
        ),
        site = escape(&config.site_name),
    );

    Panel {
        kind: PanelKind::AdBlockNotice,
        markup,
    }
}

pub fn whitelist_instructions(config: &AlternativesConfig) -> Panel {
    let steps: String = WHITELIST_STEPS
        .iter()
        .map(|(product, step)| {
            format!(
                r#"<div class="step"><h4>{product}</h4><p>{}</p></div>"#,
                step.replace("{domain}", &format!("\"{}\"", escape(&config.site_domain)))
            )
        })
        .collect();

    Panel {
        kind: PanelKind::WhitelistInstructions,
        markup: format!(
            r#"<div class="whitelist-instructions"><div class="instructions-content"><h3>How to Whitelist This Site</h3><div class="instructions-steps">{steps}</div><button class="btn-instructions-close">I've Whitelisted the Site</button></div></div>"#
        ),
    }
}

pub fn donation(config: &AlternativesConfig) -> Panel {
    let options: String = config
        .donation_amounts
        .iter()
        .map(|amount| {
            format!(r#"<button class="donation-option" data-amount="{amount}">${amount}</button>"#)
        })
        .collect();

    Panel {
        kind: PanelKind::Donation,
        markup: format!(
            r#"<div class="donation-banner"><div class="donation-content"><h4>Support {site}</h4><p>Consider donating to help keep the site free and ad-free!</p><div class="donation-options">{options}</div><button class="donation-custom">Custom Amount</button></div></div>"#,
            site = escape(&config.site_name),
        ),
    }
}

pub fn donation_thanks(amount: u32) -> Panel {
    Panel {
        kind: PanelKind::DonationThanks,
        markup: format!(r#"<div class="donation-thanks">Thank you for your ${amount} donation!</div>"#),
    }
}

pub fn premium(config: &AlternativesConfig) -> Panel {
    Panel {
        kind: PanelKind::Premium,
        markup: format!(
            r#"<div class="premium-banner"><div class="premium-content"><h4>Go Premium!</h4><p>Get an ad-free experience and exclusive features for just ${:.2}/month</p><button class="btn-premium">Upgrade Now</button></div></div>"#,
            config.premium_monthly
        ),
    }
}

/// Savings of the yearly plan over twelve monthly payments, as a whole percent
pub fn yearly_savings_percent(config: &AlternativesConfig) -> u32 {
    let twelve_months = config.premium_monthly * 12.0;
    if twelve_months <= 0.0 || config.premium_yearly >= twelve_months {
        return 0;
    }

    ((1.0 - config.premium_yearly / twelve_months) * 100.0).round() as u32
}

pub fn premium_plans(config: &AlternativesConfig) -> Panel {
    Panel {
        kind: PanelKind::PremiumPlans,
        markup: format!(
            concat!(
                r#"<div class="premium-modal"><div class="premium-modal-content"><h3>Premium Membership</h3>"#,
                r#"<div class="premium-features"><p>Ad-free gaming experience</p><p>Exclusive games</p><p>Early access to new games</p><p>Priority support</p><p>Custom themes</p></div>"#,
                r#"<div class="premium-pricing">"#,
                r#"<div class="pricing-option"><h4>Monthly</h4><div class="price">${monthly:.2}<span>/month</span></div><button class="btn-subscribe" data-plan="monthly">Subscribe</button></div>"#,
                r#"<div class="pricing-option featured"><div class="popular-badge">MOST POPULAR</div><h4>Yearly</h4><div class="price">${yearly:.2}<span>/year</span></div><div class="savings">Save {savings}%</div><button class="btn-subscribe" data-plan="yearly">Subscribe</button></div>"#,
                r#"</div></div></div>"#,
            ),
            monthly = config.premium_monthly,
            yearly = config.premium_yearly,
            savings = yearly_savings_percent(config),
        ),
    }
}

fn offer_markup(offer: &AffiliateOffer) -> String {
    format!(
        r#"<a href="{link}" class="affiliate-offer" target="_blank"><img src="{image}" alt="{title}"><div class="offer-content"><h5>{title}</h5><p>{description}</p><span class="commission">Earn ${commission} commission</span></div></a>"#,
        link = escape(&offer.link),
        image = escape(&offer.image),
        title = escape(&offer.title),
        description = escape(&offer.description),
        commission = offer.commission,
    )
}

pub fn affiliate_offers(config: &AlternativesConfig) -> Panel {
    let offers: String = config.affiliate_offers.iter().map(offer_markup).collect();

    Panel {
        kind: PanelKind::AffiliateOffers,
        markup: format!(r#"<div class="affiliate-banner">{offers}</div>"#),
    }
}

pub fn affiliate_content(offer: &AffiliateOffer) -> ContentDescriptor {
    ContentDescriptor::Affiliate {
        offer: offer.clone(),
        markup: offer_markup(offer),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_yearly_savings_rounds_to_whole_percent() {
        assert_eq!(yearly_savings_percent(&AlternativesConfig::default()), 16);

        let pricier = AlternativesConfig {
            premium_yearly: 50.0,
            ..Default::default()
        };
        assert_eq!(yearly_savings_percent(&pricier), 0);
    }

    #[test]
    fn test_whitelist_steps_cover_known_blockers() {
        let panel = whitelist_instructions(&AlternativesConfig::default());
        for product in ["uBlock Origin", "AdBlock Plus", "AdBlock"] {
            assert!(panel.markup.contains(product), "{product}");
        }
        assert!(panel.markup.contains("\"car-games.com\""));
    }

    #[test]
    fn test_configured_text_is_escaped() {
        let config = AlternativesConfig {
            site_name: "Cars & <Games>".to_string(),
            affiliate_offers: vec![AffiliateOffer {
                title: r#"Wheel" onerror="x"#.to_string(),
                description: "Fast".to_string(),
                image: "wheel.jpg".to_string(),
                link: "https://shop.example/?a=1&b=2".to_string(),
                commission: 10,
            }],
            ..Default::default()
        };

        assert!(ad_block_notice(&config).markup.contains("Cars &amp; &lt;Games&gt; is free"));
        assert!(donation(&config).markup.contains("Support Cars &amp; &lt;Games&gt;"));

        let offers = affiliate_offers(&config).markup;
        assert!(offers.contains(r#"alt="Wheel&quot; onerror=&quot;x""#));
        assert!(offers.contains("?a=1&amp;b=2"));
    }

    #[test]
    fn test_donation_panel_lists_amounts() {
        let panel = donation(&AlternativesConfig::default());
        for amount in [3, 5, 10, 20] {
            assert!(panel.markup.contains(&format!(r#"data-amount="{amount}""#)));
        }
    }
}
