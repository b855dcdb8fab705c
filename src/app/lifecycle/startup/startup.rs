use crate::app::lifecycle::context::StartupContext;
use crate::app::lifecycle::startup::tasks::config_load::ConfigLoadTask;
use crate::app::lifecycle::startup::tasks::observability::ConfigureObservabilityTask;
use crate::app::lifecycle::startup::tasks::session_start::SessionStartTask;
use crate::app::lifecycle::startup::tasks::storage_open::StorageOpenTask;
use crate::core::config_manager::ConfigManager;
use crate::core::pipeline::{Pipeline, PipelineBuilder};
use std::path::PathBuf;

pub fn build_start_pipeline(cfg_path: PathBuf) -> Pipeline<StartupContext, anyhow::Error> {
    let cfg_manager = ConfigManager::new(cfg_path);

    PipelineBuilder::new()
        .with_blocking(Box::new(ConfigLoadTask::new(cfg_manager)))
        .with_blocking(Box::new(ConfigureObservabilityTask))
        .with_blocking(Box::new(StorageOpenTask))
        .with_async(Box::new(SessionStartTask))
        .build()
        .expect("Startup pipeline should have tasks!")
}
