use crate::core::models::{AffiliateOffer, NetworkConfig, NetworkId, SlotDeclaration};
use anyhow::bail;
use config::Config;
use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize, Builder)]
#[builder(default)]
#[serde(default)]
pub struct RefreshConfig {
    pub enabled: bool,
    /// Time between refresh ticks
    #[serde(with = "humantime_serde")]
    pub interval: Duration,
    /// Total slot refreshes allowed for the whole session
    pub max_per_session: u32,
    /// Slots clicked within this window are never refreshed
    #[serde(with = "humantime_serde")]
    pub cooldown_after_click: Duration,
    /// Fraction of the slot which must be visible to refresh it
    pub viewability_threshold: f32,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval: Duration::from_secs(30),
            max_per_session: 10,
            cooldown_after_click: Duration::from_secs(60),
            viewability_threshold: 0.5,
        }
    }
}

/// What to conclude when the blocker probe cannot be measured
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AmbiguityPolicy {
    /// Show ads, a false positive would suppress real revenue
    #[default]
    AssumeNotBlocked,
    AssumeBlocked,
}

#[derive(Debug, Clone, Serialize, Deserialize, Builder)]
#[builder(default)]
#[serde(default)]
pub struct DetectorConfig {
    /// How long the bait element is left in place before measuring
    #[serde(with = "humantime_serde")]
    pub probe_delay: Duration,
    pub on_ambiguous: AmbiguityPolicy,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            probe_delay: Duration::from_millis(100),
            on_ambiguous: AmbiguityPolicy::AssumeNotBlocked,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Builder)]
#[builder(setter(into), default)]
#[serde(default)]
pub struct FallbackConfig {
    pub enabled: bool,
    pub image: String,
    pub link: String,
    pub cta: String,
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            image: "assets/images/fallback-ad.jpg".to_string(),
            link: "/advertise".to_string(),
            cta: "Advertise Here".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AlternativesConfig {
    /// Site name used in the notice and whitelist copy
    pub site_name: String,
    pub site_domain: String,
    pub donation_amounts: Vec<u32>,
    pub premium_monthly: f64,
    pub premium_yearly: f64,
    pub affiliate_offers: Vec<AffiliateOffer>,
}

impl Default for AlternativesConfig {
    fn default() -> Self {
        Self {
            site_name: "Car Games".to_string(),
            site_domain: "car-games.com".to_string(),
            donation_amounts: vec![3, 5, 10, 20],
            premium_monthly: 2.99,
            premium_yearly: 29.99,
            affiliate_offers: vec![
                AffiliateOffer {
                    title: "Racing Wheel Sale".to_string(),
                    description: "Get 20% off premium racing wheels".to_string(),
                    image: "assets/images/affiliate/wheel.jpg".to_string(),
                    link: "https://example.com/affiliate/wheel".to_string(),
                    commission: 15,
                },
                AffiliateOffer {
                    title: "Gaming Chair".to_string(),
                    description: "Ergonomic chair for long gaming sessions".to_string(),
                    image: "assets/images/affiliate/chair.jpg".to_string(),
                    link: "https://example.com/affiliate/chair".to_string(),
                    commission: 12,
                },
            ],
        }
    }
}

/// Inclusive dollar range a simulated value is drawn from
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValueRange {
    pub min: f64,
    pub max: f64,
}

impl ValueRange {
    pub const fn new(min: f64, max: f64) -> Self {
        ValueRange { min, max }
    }

    pub fn contains(&self, value: f64) -> bool {
        (self.min..=self.max).contains(&value)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RevenueConfig {
    /// CPM-like value per impression
    pub impression: ValueRange,
    /// CPC-like value per click
    pub click: ValueRange,
}

impl Default for RevenueConfig {
    fn default() -> Self {
        Self {
            impression: ValueRange::new(0.001, 0.006),
            click: ValueRange::new(0.05, 0.20),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PageRevenueConfig {
    pub enabled: bool,
    #[serde(with = "humantime_serde")]
    pub interval: Duration,
    /// Upper (exclusive) bound of each simulated increment
    pub max_increment: f64,
}

impl Default for PageRevenueConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval: Duration::from_secs(60),
            max_increment: 0.5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacementConfig {
    /// Placement trials only run in admin sessions
    pub enabled: bool,
    #[serde(with = "humantime_serde")]
    pub trial_spacing: Duration,
    #[serde(with = "humantime_serde")]
    pub trial_duration: Duration,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            trial_spacing: Duration::from_secs(60),
            trial_duration: Duration::from_secs(60),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// JSON file backing the key-value store, in-memory when unset
    pub path: Option<PathBuf>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: Some(PathBuf::from("adslot-storage.json")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Builder)]
#[builder(default)]
#[serde(default)]
pub struct AdSlotConfig {
    pub enabled: bool,
    pub networks: Vec<NetworkConfig>,
    /// Network ids in the order they are tried
    pub priority: Vec<NetworkId>,
    pub refresh: RefreshConfig,
    /// Visible fraction at which a slot counts an impression
    pub impression_threshold: f32,
    pub detector: DetectorConfig,
    pub fallback: FallbackConfig,
    pub alternatives: AlternativesConfig,
    pub revenue: RevenueConfig,
    pub page_revenue: PageRevenueConfig,
    pub placements: PlacementConfig,
    /// Delay between consecutive slot loads at startup
    #[serde(with = "humantime_serde")]
    pub load_stagger: Duration,
    pub storage: StorageConfig,
    /// Slot containers exposed by the headless host
    pub slots: Vec<SlotDeclaration>,
    pub logging: LoggingConfig,
}

fn default_networks() -> Vec<NetworkConfig> {
    let google = NetworkConfig {
        id: NetworkId::new("google"),
        enabled: true,
        publisher_id: "ca-pub-YOUR_PUBLISHER_ID".to_string(),
        slots: [
            ("leaderboard", "1234567890"),
            ("rectangle", "0987654321"),
            ("skyscraper", "1122334455"),
        ]
        .into_iter()
        .map(|(size, unit)| (size.to_string(), unit.to_string()))
        .collect(),
    };

    let mut networks = vec![google];
    for id in ["mediavine", "propeller", "adsterra"] {
        networks.push(NetworkConfig {
            id: NetworkId::new(id),
            enabled: false,
            publisher_id: "YOUR_SITE_ID".to_string(),
            ..Default::default()
        });
    }

    networks
}

impl Default for AdSlotConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            networks: default_networks(),
            priority: ["google", "mediavine", "propeller", "adsterra"]
                .into_iter()
                .map(NetworkId::new)
                .collect(),
            refresh: RefreshConfig::default(),
            impression_threshold: 0.5,
            detector: DetectorConfig::default(),
            fallback: FallbackConfig::default(),
            alternatives: AlternativesConfig::default(),
            revenue: RevenueConfig::default(),
            page_revenue: PageRevenueConfig::default(),
            placements: PlacementConfig::default(),
            load_stagger: Duration::from_millis(500),
            storage: StorageConfig::default(),
            slots: Vec::new(),
            logging: LoggingConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileRotation {
    Daily,
    Hourly,
    Never,
}

impl Default for FileRotation {
    fn default() -> Self {
        FileRotation::Daily
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogSink {
    #[serde(flatten)]
    pub dest: LogType,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum LogType {
    Stdout {
        #[serde(default = "default_true")]
        color: bool,
        #[serde(default)]
        json: bool,
    },
    File {
        path: PathBuf,
        #[serde(default)]
        json: bool,
        #[serde(default)]
        rotation: FileRotation,
        #[serde(default)]
        max_files: usize,
    },
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default)]
    pub level: String,
    /// Fraction of refresh ticks traced as root spans
    #[serde(default)]
    pub span_sample_rate: f32,
    #[serde(default)]
    pub sinks: Vec<LogSink>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            span_sample_rate: 0.01,
            sinks: vec![LogSink {
                dest: LogType::Stdout {
                    color: true,
                    json: false,
                },
            }],
        }
    }
}

impl LoggingConfig {
    /// Validates the logging configuration
    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.sinks.is_empty() {
            bail!("At least one logging sink must be configured");
        }

        self.level.parse::<tracing::Level>().map_err(|_| {
            anyhow::anyhow!(
                "Invalid log level: '{}'. Valid levels: trace, debug, info, warn, error",
                self.level
            )
        })?;

        if !(0.0..=1.0).contains(&self.span_sample_rate) {
            bail!(
                "span_sample_rate must be between 0.0 and 1.0, got {}",
                self.span_sample_rate
            );
        }

        Ok(())
    }
}

fn validate_range(name: &str, range: &ValueRange) -> Result<(), anyhow::Error> {
    if !range.min.is_finite() || !range.max.is_finite() {
        bail!("{name} revenue range bounds must be finite");
    }

    if range.min < 0.0 || range.max < 0.0 {
        bail!("{name} revenue range cannot be negative");
    }

    if range.min > range.max {
        bail!("{name} revenue range min {} exceeds max {}", range.min, range.max);
    }

    Ok(())
}

impl AdSlotConfig {
    pub fn load(path: &PathBuf) -> Result<AdSlotConfig, anyhow::Error> {
        let cfg = Config::builder()
            .add_source(config::File::from(path.to_path_buf()))
            .add_source(
                config::Environment::with_prefix("ADSLOT")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?;

        let loaded: AdSlotConfig = cfg.try_deserialize()?;
        loaded.validate()?;

        Ok(loaded)
    }

    pub fn network(&self, id: &NetworkId) -> Option<&NetworkConfig> {
        self.networks.iter().find(|n| &n.id == id)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.priority.is_empty() {
            bail!("Network priority list cannot be empty");
        }

        for id in &self.priority {
            if self.network(id).is_none() {
                bail!("Priority lists network '{id}' which has no config");
            }
        }

        if self.refresh.interval.is_zero() {
            bail!("Refresh interval must be greater than zero");
        }

        for (name, value) in [
            ("refresh.viewability_threshold", self.refresh.viewability_threshold),
            ("impression_threshold", self.impression_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                bail!("{name} must be between 0.0 and 1.0, got {value}");
            }
        }

        validate_range("impression", &self.revenue.impression)?;
        validate_range("click", &self.revenue.click)?;

        if !self.page_revenue.max_increment.is_finite() || self.page_revenue.max_increment < 0.0 {
            bail!(
                "page_revenue.max_increment must be finite and non-negative, got {}",
                self.page_revenue.max_increment
            );
        }

        if self.page_revenue.interval.is_zero() {
            bail!("Page revenue interval must be greater than zero");
        }

        Ok(())
    }
}
