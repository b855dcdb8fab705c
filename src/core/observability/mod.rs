#[macro_use]
pub mod macros;
mod provider;

pub use provider::{LogGuards, init};
