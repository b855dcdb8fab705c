pub mod analytics;
pub mod config_manager;
pub mod detector;
pub mod host;
pub mod markup;
pub mod models;
pub mod monetization;
pub mod networks;
#[macro_use]
pub mod observability;
pub mod pipeline;
pub mod placements;
pub mod registry;
pub mod render;
pub mod revenue;
pub mod scheduler;
pub mod storage;
pub mod viewability;
