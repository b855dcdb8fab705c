mod headless;

pub use headless::HeadlessHost;

use crate::core::models::{ContentDescriptor, Panel, PanelKind, SlotDeclaration};

/// The page hosting the ad slots. The session only touches the page
/// through this trait
pub trait AdHost: Send + Sync {
    /// Ad containers currently on the page, safe to call repeatedly
    fn slots(&self) -> Vec<SlotDeclaration>;

    /// Replaces the content of a slot container. Returns false when the
    /// container no longer exists
    fn apply(&self, slot_id: &str, content: &ContentDescriptor) -> bool;

    fn show_panel(&self, panel: &Panel);

    fn remove_panel(&self, kind: PanelKind);

    /// Inserts a new unit into the page, used for placement trials
    fn insert_unit(&self, _declaration: &SlotDeclaration, _content: &ContentDescriptor) -> bool {
        false
    }

    /// Reloads the page so detection runs again
    fn reload(&self);

    /// Cosmetic revenue readout
    fn revenue_display(&self, _total: f64) {}

    /// Page level earnings readout, today and all time
    fn page_revenue_display(&self, _today: f64, _total: f64) {}
}
