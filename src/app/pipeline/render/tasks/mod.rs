mod apply_content;
mod record_load;
mod render_content;
mod select_network;

pub use apply_content::ApplyContentTask;
pub use record_load::RecordLoadTask;
pub use render_content::RenderContentTask;
pub use select_network::SelectNetworkTask;
