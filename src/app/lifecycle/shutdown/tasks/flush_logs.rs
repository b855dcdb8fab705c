use crate::app::lifecycle::context::StartupContext;
use crate::core::pipeline::BlockingTask;
use anyhow::Error;
use tracing::info;

/// Drops the log writer guards, blocking until buffered lines are written
pub struct FlushLogsTask;

impl BlockingTask<StartupContext, Error> for FlushLogsTask {
    fn run(&self, context: &StartupContext) -> Result<(), Error> {
        let Some(guards) = context.log_guards.lock().take() else {
            return Ok(());
        };

        info!("Flushing logs, goodbye");
        drop(guards);

        Ok(())
    }
}
