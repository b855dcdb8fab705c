//! Ad slot lifecycle management: ad blocker detection, network selection
//! and rendering, viewability driven impressions and refreshes, revenue
//! accounting and alternative monetization when ads are blocked

#[macro_use]
pub mod core;
pub mod app;
