use crate::core::detector::{BaitId, BaitSpec, BaitSurface};
use crate::core::host::AdHost;
use crate::core::models::{ContentDescriptor, Panel, PanelKind, SlotDeclaration};
use anyhow::Error;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use tracing::debug;

#[derive(Debug, Clone)]
struct Container {
    declaration: SlotDeclaration,
    content: Option<ContentDescriptor>,
    applied: u32,
}

/// In-memory page with no rendering engine. Stores whatever content the
/// session applies and simulates an ad blocker by collapsing bait elements
#[derive(Default)]
pub struct HeadlessHost {
    containers: RwLock<BTreeMap<String, Container>>,
    order: RwLock<Vec<String>>,
    panels: RwLock<Vec<Panel>>,
    blocking: AtomicBool,
    baits: RwLock<BTreeMap<u64, BaitSpec>>,
    next_bait: AtomicU64,
    reloads: AtomicU32,
    revenue: RwLock<f64>,
    page_revenue: RwLock<(f64, f64)>,
}

impl HeadlessHost {
    pub fn new(declarations: &[SlotDeclaration]) -> Self {
        let host = Self::default();
        for declaration in declarations {
            host.add_slot(declaration.clone());
        }
        host
    }

    /// Simulates an ad blocker hiding bait elements
    pub fn with_blocker(self, blocking: bool) -> Self {
        self.blocking.store(blocking, Ordering::Release);
        self
    }

    pub fn set_blocking(&self, blocking: bool) {
        self.blocking.store(blocking, Ordering::Release);
    }

    /// Adds a container, e.g. after more content was inserted into the page
    pub fn add_slot(&self, declaration: SlotDeclaration) {
        let id = declaration.id.clone();
        let mut containers = self.containers.write();
        if containers.contains_key(&id) {
            return;
        }

        containers.insert(
            id.clone(),
            Container {
                declaration,
                content: None,
                applied: 0,
            },
        );
        self.order.write().push(id);
    }

    pub fn remove_slot(&self, slot_id: &str) {
        self.containers.write().remove(slot_id);
        self.order.write().retain(|id| id != slot_id);
    }

    pub fn content(&self, slot_id: &str) -> Option<ContentDescriptor> {
        self.containers
            .read()
            .get(slot_id)
            .and_then(|c| c.content.clone())
    }

    /// How many times content was applied to a slot
    pub fn applied(&self, slot_id: &str) -> u32 {
        self.containers.read().get(slot_id).map_or(0, |c| c.applied)
    }

    pub fn panels(&self) -> Vec<PanelKind> {
        self.panels.read().iter().map(|p| p.kind).collect()
    }

    pub fn panel(&self, kind: PanelKind) -> Option<Panel> {
        self.panels.read().iter().find(|p| p.kind == kind).cloned()
    }

    pub fn reloads(&self) -> u32 {
        self.reloads.load(Ordering::Acquire)
    }

    pub fn displayed_revenue(&self) -> f64 {
        *self.revenue.read()
    }

    /// Last page revenue readout as `(today, total)`
    pub fn displayed_page_revenue(&self) -> (f64, f64) {
        *self.page_revenue.read()
    }

    /// Bait elements still present in the page
    pub fn live_baits(&self) -> usize {
        self.baits.read().len()
    }
}

impl AdHost for HeadlessHost {
    fn slots(&self) -> Vec<SlotDeclaration> {
        let containers = self.containers.read();
        self.order
            .read()
            .iter()
            .filter_map(|id| containers.get(id).map(|c| c.declaration.clone()))
            .collect()
    }

    fn apply(&self, slot_id: &str, content: &ContentDescriptor) -> bool {
        let mut containers = self.containers.write();
        let Some(container) = containers.get_mut(slot_id) else {
            return false;
        };

        container.content = Some(content.clone());
        container.applied += 1;
        true
    }

    fn show_panel(&self, panel: &Panel) {
        let mut panels = self.panels.write();
        panels.retain(|p| p.kind != panel.kind);
        panels.push(panel.clone());
    }

    fn remove_panel(&self, kind: PanelKind) {
        self.panels.write().retain(|p| p.kind != kind);
    }

    fn insert_unit(&self, declaration: &SlotDeclaration, content: &ContentDescriptor) -> bool {
        self.add_slot(declaration.clone());
        self.apply(&declaration.id, content)
    }

    fn reload(&self) {
        debug!("Headless page reload requested");
        self.reloads.fetch_add(1, Ordering::AcqRel);
        self.panels.write().clear();
    }

    fn revenue_display(&self, total: f64) {
        *self.revenue.write() = total;
    }

    fn page_revenue_display(&self, today: f64, total: f64) {
        *self.page_revenue.write() = (today, total);
    }
}

impl BaitSurface for HeadlessHost {
    fn insert_bait(&self, bait: &BaitSpec) -> Result<BaitId, Error> {
        let id = self.next_bait.fetch_add(1, Ordering::AcqRel);
        self.baits.write().insert(id, bait.clone());
        Ok(BaitId(id))
    }

    fn measure_height(&self, id: BaitId) -> Option<u32> {
        let baits = self.baits.read();
        let bait = baits.get(&id.0)?;

        if self.blocking.load(Ordering::Acquire) {
            Some(0)
        } else {
            Some(bait.height_px)
        }
    }

    fn remove_bait(&self, id: BaitId) {
        self.baits.write().remove(&id.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::SlotSize;

    #[test]
    fn test_apply_to_missing_container_is_noop() {
        let host = HeadlessHost::new(&[SlotDeclaration::new("a", SlotSize::Auto)]);
        assert!(host.apply("a", &ContentDescriptor::Empty));
        assert!(!host.apply("b", &ContentDescriptor::Empty));
        assert_eq!(host.applied("a"), 1);

        host.remove_slot("a");
        assert!(!host.apply("a", &ContentDescriptor::Empty));
        assert!(host.slots().is_empty());
    }

    #[test]
    fn test_slots_keep_page_order() {
        let host = HeadlessHost::new(&[
            SlotDeclaration::new("top", SlotSize::Leaderboard),
            SlotDeclaration::new("mid", SlotSize::Rectangle),
        ]);
        host.add_slot(SlotDeclaration::new("bottom", SlotSize::Leaderboard));
        host.add_slot(SlotDeclaration::new("top", SlotSize::Auto));

        let ids: Vec<String> = host.slots().into_iter().map(|d| d.id).collect();
        assert_eq!(ids, vec!["top", "mid", "bottom"]);
    }

    #[test]
    fn test_blocker_collapses_bait() {
        let host = HeadlessHost::default().with_blocker(true);
        let id = host.insert_bait(&BaitSpec::default()).unwrap();
        assert_eq!(host.measure_height(id), Some(0));

        host.set_blocking(false);
        assert_eq!(host.measure_height(id), Some(1));

        host.remove_bait(id);
        assert_eq!(host.measure_height(id), None);
        assert_eq!(host.live_baits(), 0);
    }
}
