use crate::app::lifecycle::context::StartupContext;
use crate::core::config_manager::ConfigManager;
use crate::core::pipeline::BlockingTask;
use anyhow::{Error, anyhow};

pub(crate) struct ConfigLoadTask {
    manager: ConfigManager,
}

impl ConfigLoadTask {
    pub fn new(manager: ConfigManager) -> Self {
        Self { manager }
    }
}

impl BlockingTask<StartupContext, anyhow::Error> for ConfigLoadTask {
    fn run(&self, context: &StartupContext) -> Result<(), Error> {
        self.manager.start()?;

        let config = self.manager.get()?;

        // logging is not configured yet
        println!("Config loaded from {}", self.manager.path().display());
        println!("{:?}", config);

        context
            .config
            .set(config)
            .map_err(|_| anyhow!("Config already loaded"))
    }
}
