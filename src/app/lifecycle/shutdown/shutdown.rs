use crate::app::lifecycle::context::StartupContext;
use crate::app::lifecycle::shutdown::tasks::flush_logs::FlushLogsTask;
use crate::app::lifecycle::shutdown::tasks::stop_session::StopSessionTask;
use crate::app::span::WrappedPipelineTask;
use crate::core::pipeline::{Pipeline, PipelineBuilder};
use tracing::info_span;

/// Builds the shutdown pipeline, which takes the resulting `StartupContext`
/// which is responsible for attaching anything which may need shutdown
pub fn build_shutdown_pipeline() -> Pipeline<StartupContext, anyhow::Error> {
    let shutdown_pipeline = PipelineBuilder::new()
        .with_async(Box::new(StopSessionTask))
        .build()
        .expect("Shutdown pipeline should have tasks!");

    let observed_pipeline =
        WrappedPipelineTask::new(shutdown_pipeline, || info_span!("shutdown_pipeline"));

    // logs flush last, outside the shutdown span
    PipelineBuilder::new()
        .with_async(Box::new(observed_pipeline))
        .with_blocking(Box::new(FlushLogsTask))
        .build()
        .expect("Shutdown pipeline should have tasks!")
}
