use crate::app::lifecycle::context::StartupContext;
use crate::core::observability;
use crate::core::pipeline::BlockingTask;
use anyhow::Error;
use tracing::info;

pub struct ConfigureObservabilityTask;

impl BlockingTask<StartupContext, Error> for ConfigureObservabilityTask {
    fn run(&self, context: &StartupContext) -> Result<(), Error> {
        let config = context
            .config
            .get()
            .ok_or_else(|| anyhow::anyhow!("Config not loaded before observability initialization"))?;

        let guards = observability::init(&config.logging)?;
        let sinks = guards.len();
        *context.log_guards.lock() = Some(guards);

        info!("Hello world! Observability configured with {} sinks", sinks);

        Ok(())
    }
}
