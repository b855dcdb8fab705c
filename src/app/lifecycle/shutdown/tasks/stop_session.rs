use crate::app::lifecycle::context::StartupContext;
use crate::core::pipeline::AsyncTask;
use anyhow::Error;
use async_trait::async_trait;
use tracing::{info, instrument};

pub(crate) struct StopSessionTask;

#[async_trait]
impl AsyncTask<StartupContext, anyhow::Error> for StopSessionTask {
    #[instrument(skip_all, name = "session_shutdown_task")]
    async fn run(&self, context: &StartupContext) -> Result<(), Error> {
        match context.session.get() {
            Some(session) => {
                info!("Stopping ad session..");
                session.shutdown().await;

                let revenue = session.revenue().state();
                info!(
                    "Ad session stopped, {} loads {} clicks ${:.4} total",
                    revenue.ads_loaded, revenue.ads_clicked, revenue.total_revenue
                );
            }
            None => {
                info!("Skipping session shutdown, was never started");
            }
        }

        Ok(())
    }
}
