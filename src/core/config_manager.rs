use crate::app::config::AdSlotConfig;
use anyhow::{Error, bail};
use arc_swap::ArcSwapOption;
use std::path::PathBuf;
use std::sync::Arc;

/// Loads the local cfg file once at startup. Configuration is static for
/// the life of a session, readers get a shared snapshot
pub struct ConfigManager {
    path: PathBuf,
    cfg: ArcSwapOption<AdSlotConfig>,
}

impl ConfigManager {
    pub fn new(cfg_path: PathBuf) -> ConfigManager {
        ConfigManager {
            path: cfg_path,
            cfg: ArcSwapOption::empty(),
        }
    }

    /// Wraps an already built config, e.g. in tests
    pub fn from_config(config: AdSlotConfig) -> ConfigManager {
        ConfigManager {
            path: PathBuf::new(),
            cfg: ArcSwapOption::from_pointee(config),
        }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// Loads and validates the config file
    pub fn start(&self) -> Result<(), Error> {
        let cfg = AdSlotConfig::load(&self.path)?;
        self.cfg.store(Some(Arc::new(cfg)));

        Ok(())
    }

    /// The loaded config snapshot
    pub fn get(&self) -> Result<Arc<AdSlotConfig>, Error> {
        match self.cfg.load_full() {
            Some(cfg) => Ok(cfg),
            None => bail!("ConfigManager not started yet but fetching config"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_before_start_fails() {
        let manager = ConfigManager::new(PathBuf::from("missing.yaml"));
        assert!(manager.get().is_err());
        assert!(manager.start().is_err());
    }

    #[test]
    fn test_from_config_is_ready() {
        let manager = ConfigManager::from_config(AdSlotConfig::default());
        assert_eq!(manager.get().unwrap().refresh.max_per_session, 10);
    }
}
