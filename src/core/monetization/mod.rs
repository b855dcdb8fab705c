mod panels;
mod presenter;

pub use presenter::AlternativeMonetization;
