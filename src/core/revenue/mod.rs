mod accumulator;
mod model;
mod page;
mod projection;

pub use accumulator::RevenueAccumulator;
pub use model::{RevenueEvent, RevenueModel, SimulatedRevenue};
pub use page::PageRevenueMirror;
pub use projection::{RevenueBreakdown, RevenueProjection, load_metrics, project, save_metrics};
