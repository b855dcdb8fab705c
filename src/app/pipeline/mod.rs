/// Pipeline which selects, renders and applies content for a single
/// slot, used for both the initial load and refreshes
pub mod render;
