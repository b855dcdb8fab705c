use crate::app::config::AdSlotConfig;
use crate::app::session::AdSession;
use crate::core::host::HeadlessHost;
use crate::core::observability::LogGuards;
use crate::core::storage::KeyValueStore;
use parking_lot::Mutex;
use std::sync::{Arc, OnceLock};

#[derive(Default)]
pub struct StartupContext {
    // Transient items that are assigned but taken ownership of later
    /// Log writer guards, taken and dropped by shutdown to flush logs
    pub log_guards: Mutex<Option<LogGuards>>,

    /// Validated config snapshot
    pub config: OnceLock<Arc<AdSlotConfig>>,

    // Shared things and data providers
    /// Backing store for revenue and placement results
    pub store: OnceLock<Arc<dyn KeyValueStore>>,
    /// The page the session manages, headless when run standalone
    pub host: OnceLock<Arc<HeadlessHost>>,

    /// The running ad session
    pub session: OnceLock<Arc<AdSession>>,
}
