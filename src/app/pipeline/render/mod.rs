//! Houses the per slot render pipeline. Each initial load or refresh
//! picks a network, renders its markup, hands it to the host and
//! records the load against the registry and revenue counters

pub mod context;
pub mod pipeline;
mod tasks;

pub use context::{RenderReason, SlotRenderContext};
pub use pipeline::build_render_pipeline;
