use crate::core::markup::escape;
use crate::core::models::{NetworkConfig, SlotSize};
use crate::core::networks::NetworkRenderer;

/// Networks served through a site id plus a tag script, the unit is a
/// placeholder element the network script fills in
pub struct ScriptedRenderer {
    class: &'static str,
    script: &'static str,
}

impl ScriptedRenderer {
    pub const fn new(class: &'static str, script: &'static str) -> Self {
        ScriptedRenderer { class, script }
    }

    pub const fn mediavine() -> Self {
        Self::new("mv-ad", "https://scripts.mediavine.com/tags/site.js")
    }

    pub const fn propeller() -> Self {
        Self::new("propeller-ad", "https://propellerads.com/tag.js")
    }

    pub const fn adsterra() -> Self {
        Self::new("adsterra-ad", "https://adsterra.com/invoke.js")
    }
}

impl NetworkRenderer for ScriptedRenderer {
    fn markup(&self, config: &NetworkConfig, slot_id: &str, size: SlotSize) -> String {
        let placement = config.unit_for(size).unwrap_or(slot_id);

        format!(
            r#"<div class="{class}" data-site-id="{site}" data-placement="{placement}" data-size="{dims}"></div><script async src="{script}"></script>"#,
            class = self.class,
            site = escape(&config.publisher_id),
            placement = escape(placement),
            dims = size.dimensions(),
            script = self.script,
        )
    }
}
