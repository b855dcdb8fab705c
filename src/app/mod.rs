pub mod config;
pub mod lifecycle;
/// Per slot task pipelines
pub mod pipeline;
pub mod session;
pub mod span;

pub use lifecycle::{context, shutdown, startup};
