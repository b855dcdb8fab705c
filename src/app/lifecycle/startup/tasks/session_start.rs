use crate::app::lifecycle::context::StartupContext;
use crate::app::session::AdSession;
use crate::core::host::HeadlessHost;
use crate::core::pipeline::AsyncTask;
use anyhow::{Error, anyhow, bail};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info, instrument};

/// Builds the headless page from the declared slots and starts the session on it
pub struct SessionStartTask;

#[async_trait]
impl AsyncTask<StartupContext, Error> for SessionStartTask {
    #[instrument(skip_all, name = "session_start_task")]
    async fn run(&self, context: &StartupContext) -> Result<(), Error> {
        let Some(config) = context.config.get() else {
            bail!("Config not loaded?! Cant start ad session");
        };

        let Some(store) = context.store.get() else {
            bail!("No storage opened?! Cant start ad session");
        };

        let host = Arc::new(HeadlessHost::new(&config.slots));
        let session = Arc::new(AdSession::new(
            config.clone(),
            store.clone(),
            host.clone(),
            host.clone(),
        ));

        let state = session.start().await;
        info!(
            "Ad session {} with {} slots, lifetime revenue ${:.4}",
            state,
            session.registry().len(),
            session.revenue().state().total_revenue
        );

        context
            .host
            .set(host)
            .map_err(|_| anyhow!("Host already attached to startup context"))?;
        context
            .session
            .set(session)
            .map_err(|_| anyhow!("Session already attached to startup context"))?;

        Ok(())
    }
}
