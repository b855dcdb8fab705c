//! The per page view ad session. Owns every slot, timer and
//! monetization component and is handed to whoever drives the page

mod loader;
mod session;

pub use session::{AdSession, SessionState};
