use crate::app::config::AdSlotConfig;
use crate::app::pipeline::render::{RenderReason, build_render_pipeline};
use crate::app::session::loader::SlotLoader;
use crate::core::analytics::{self, AnalyticsEvent};
use crate::core::detector::{AdBlockDetector, BaitSurface};
use crate::core::host::AdHost;
use crate::core::models::{ContentDescriptor, NetworkId, PanelAction, RevenueMetrics, SlotDeclaration};
use crate::core::monetization::AlternativeMonetization;
use crate::core::networks::NetworkRegistry;
use crate::core::placements::{self, PLACEMENTS, Placement, PlacementOptimizer};
use crate::core::registry::SlotRegistry;
use crate::core::render::Renderer;
use crate::core::revenue::{
    PageRevenueMirror, RevenueAccumulator, RevenueModel, RevenueProjection, SimulatedRevenue,
    load_metrics, project,
};
use crate::core::scheduler::RefreshScheduler;
use crate::core::storage::KeyValueStore;
use crate::core::viewability::ViewabilityObserver;
use ahash::AHashMap;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use strum::Display;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum SessionState {
    /// Constructed, `start` not called yet
    Idle,
    /// Detection in progress
    Starting,
    /// Disabled in config, nothing is rendered
    Disabled,
    /// An ad blocker was detected, alternatives are presented instead
    Blocked,
    /// Slots are loading and refreshing normally
    Serving,
    Stopped,
}

/// One page view worth of ad management. Every component is owned here
/// and every timer it spawns is cancelled by [`AdSession::shutdown`]
pub struct AdSession {
    config: Arc<AdSlotConfig>,
    host: Arc<dyn AdHost>,
    registry: Arc<SlotRegistry>,
    observer: Arc<ViewabilityObserver>,
    revenue: Arc<RevenueAccumulator>,
    loader: Arc<SlotLoader>,
    scheduler: Arc<RefreshScheduler>,
    presenter: AlternativeMonetization,
    placements: Arc<PlacementOptimizer>,
    page_revenue: Arc<PageRevenueMirror>,
    metrics: RevenueMetrics,
    detector: AdBlockDetector,
    state: Mutex<SessionState>,
    tasks: Mutex<JoinSet<()>>,
}

impl AdSession {
    /// Session earning simulated revenue per the configured value ranges
    pub fn new(
        config: Arc<AdSlotConfig>,
        store: Arc<dyn KeyValueStore>,
        host: Arc<dyn AdHost>,
        surface: Arc<dyn BaitSurface>,
    ) -> AdSession {
        let model = Arc::new(SimulatedRevenue::new(&config.revenue));
        Self::with_model(config, store, host, surface, model)
    }

    pub fn with_model(
        config: Arc<AdSlotConfig>,
        store: Arc<dyn KeyValueStore>,
        host: Arc<dyn AdHost>,
        surface: Arc<dyn BaitSurface>,
        model: Arc<dyn RevenueModel>,
    ) -> AdSession {
        let registry = Arc::new(SlotRegistry::new());
        let observer = Arc::new(ViewabilityObserver::new(vec![
            config.impression_threshold,
            config.refresh.viewability_threshold,
        ]));
        let revenue = Arc::new(RevenueAccumulator::new(model, store.clone()));

        let configs: AHashMap<NetworkId, _> = config
            .networks
            .iter()
            .map(|network| (network.id.clone(), network.clone()))
            .collect();
        let renderer = Arc::new(Renderer::new(
            NetworkRegistry::with_builtins(),
            configs,
            config.fallback.clone(),
        ));

        let pipeline = build_render_pipeline(
            config.priority.clone(),
            renderer,
            host.clone(),
            registry.clone(),
            revenue.clone(),
        );

        let loader = Arc::new(SlotLoader {
            registry: registry.clone(),
            observer: observer.clone(),
            revenue: revenue.clone(),
            host: host.clone(),
            pipeline,
            impression_threshold: config.impression_threshold,
        });

        let scheduler = Arc::new(RefreshScheduler::new(
            config.refresh.clone(),
            registry.clone(),
            observer.clone(),
            loader.clone(),
            config.logging.span_sample_rate,
        ));

        AdSession {
            presenter: AlternativeMonetization::new(config.alternatives.clone(), host.clone()),
            placements: Arc::new(PlacementOptimizer::new(store.clone())),
            metrics: load_metrics(store.as_ref()),
            page_revenue: Arc::new(PageRevenueMirror::new(config.page_revenue.clone(), store)),
            detector: AdBlockDetector::new(surface, config.detector.clone()),
            config,
            host,
            registry,
            observer,
            revenue,
            loader,
            scheduler,
            state: Mutex::new(SessionState::Idle),
            tasks: Mutex::new(JoinSet::new()),
        }
    }

    pub fn state(&self) -> SessionState {
        *self.state.lock()
    }

    pub fn registry(&self) -> &SlotRegistry {
        &self.registry
    }

    pub fn revenue(&self) -> &RevenueAccumulator {
        &self.revenue
    }

    pub fn scheduler(&self) -> &RefreshScheduler {
        &self.scheduler
    }

    pub fn presenter(&self) -> &AlternativeMonetization {
        &self.presenter
    }

    pub fn placements(&self) -> &PlacementOptimizer {
        &self.placements
    }

    pub fn page_revenue(&self) -> &PageRevenueMirror {
        &self.page_revenue
    }

    /// Earnings estimate from the persisted optimizer metrics
    pub fn projection(&self) -> RevenueProjection {
        project(&self.metrics)
    }

    /// Detects an ad blocker once, then either presents the alternatives or
    /// loads every declared slot and arms the refresh timers. Calls after
    /// the first return the current state without any effect
    pub async fn start(&self) -> SessionState {
        {
            let mut state = self.state.lock();
            if *state != SessionState::Idle {
                return *state;
            }

            if !self.config.enabled {
                info!("Ad management disabled");
                *state = SessionState::Disabled;
                return *state;
            }

            *state = SessionState::Starting;
        }

        let revenue = self.revenue.load();
        self.host.revenue_display(revenue.total_revenue);
        info!("Projected revenue {}", self.projection());

        let blocked = self.detector.detect().await;

        let next = if blocked { SessionState::Blocked } else { SessionState::Serving };
        {
            let mut state = self.state.lock();
            // shutdown while detecting
            if *state != SessionState::Starting {
                return *state;
            }
            *state = next;
        }

        if blocked {
            self.presenter.present();
            return next;
        }

        let discovered = self.discover();
        info!("Ad session serving, {} slots discovered", discovered);

        self.spawn(self.scheduler.clone().run());
        self.spawn(self.page_revenue.clone().run(self.host.clone()));

        if self.config.placements.enabled {
            self.spawn_placement_trials();
        }

        next
    }

    fn spawn<F>(&self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let mut tasks = self.tasks.lock();
        reap_finished(&mut tasks);
        tasks.spawn(task);
    }

    /// Registers slots the host declared since the last call and schedules
    /// their loads, the k-th new slot after `k * load_stagger`. Known slots
    /// are left alone. Returns the number of new slots.
    ///
    /// Must be called within the runtime, loads are spawned onto it
    pub fn discover(&self) -> usize {
        if self.state() != SessionState::Serving {
            return 0;
        }

        reap_finished(&mut self.tasks.lock());

        let fresh: Vec<SlotDeclaration> = self
            .host
            .slots()
            .into_iter()
            .filter(|declaration| !placements::is_trial_unit(&declaration.id))
            .filter(|declaration| self.registry.discover(declaration))
            .collect();

        for (k, declaration) in fresh.iter().enumerate() {
            let events = self.observer.observe(&declaration.id);
            self.spawn(self.loader.clone().watch_impressions(declaration.id.clone(), events));

            let loader = self.loader.clone();
            let slot_id = declaration.id.clone();
            let delay = self.config.load_stagger * k as u32;
            self.spawn(async move {
                tokio::time::sleep(delay).await;
                loader.load(&slot_id, RenderReason::Initial).await;
            });
        }

        fresh.len()
    }

    /// Host callback with the visible fraction of a slot or trial unit
    pub fn report_visibility(&self, slot_id: &str, ratio: f32) {
        self.observer.report(slot_id, ratio);
    }

    /// Counts a click on a slot, or on the placement trial unit it belongs to
    pub fn click(&self, slot_id: &str) -> bool {
        if self.placements.record_click(slot_id) {
            return true;
        }

        let now = tokio::time::Instant::now();
        let Some(network) = self.registry.record_click(slot_id, now) else {
            debug!("Click on unknown slot {} ignored", slot_id);
            return false;
        };

        let total = self.revenue.record_click(slot_id);
        self.host.revenue_display(total);

        let source = network.as_ref().map_or("fallback", NetworkId::as_str);
        analytics::emit(&AnalyticsEvent::AdClick {
            slot: slot_id,
            source,
        });

        true
    }

    /// Forgets a slot whose container left the page. Its impression
    /// watcher ends with the released subscription
    pub fn remove_slot(&self, slot_id: &str) -> bool {
        self.observer.release(slot_id);
        self.registry.remove(slot_id).is_some()
    }

    pub fn handle_panel(&self, action: PanelAction) {
        self.presenter.handle(action);
    }

    fn spawn_placement_trials(&self) {
        let rules = self.config.placements.clone();

        for (test_id, placement) in PLACEMENTS.iter().enumerate() {
            let trial = PlacementTrial {
                test_id: test_id as u32,
                placement: *placement,
                optimizer: self.placements.clone(),
                observer: self.observer.clone(),
                host: self.host.clone(),
                threshold: self.config.impression_threshold,
            };
            let start = rules.trial_spacing * test_id as u32;
            let duration = rules.trial_duration;

            self.spawn(async move {
                tokio::time::sleep(start).await;
                trial.run(duration).await;
            });
        }
    }

    /// Cancels every timer and watcher owned by this session
    pub async fn shutdown(&self) {
        *self.state.lock() = SessionState::Stopped;
        self.scheduler.stop();

        let mut tasks = std::mem::take(&mut *self.tasks.lock());
        tasks.abort_all();
        while tasks.join_next().await.is_some() {}

        self.observer.release_all();
        info!("Ad session stopped");
    }
}

/// Drops finished loads and trials so only live timers stay in the set
fn reap_finished(tasks: &mut JoinSet<()>) {
    while let Some(res) = tasks.try_join_next() {
        match res {
            Err(e) if e.is_panic() => error!("Session task panicked: {e}"),
            _ => {}
        }
    }
}

struct PlacementTrial {
    test_id: u32,
    placement: Placement,
    optimizer: Arc<PlacementOptimizer>,
    observer: Arc<ViewabilityObserver>,
    host: Arc<dyn AdHost>,
    threshold: f32,
}

impl PlacementTrial {
    /// Inserts the trial unit, counts its impressions for `duration` then
    /// concludes the trial
    async fn run(self, duration: Duration) {
        let slot_id = self.optimizer.begin(self.test_id, &self.placement);
        let mut events = self.observer.observe(&slot_id);

        let unit = SlotDeclaration::new(slot_id.clone(), self.placement.size);
        let content = ContentDescriptor::House {
            markup: format!(
                r#"<div class="test-ad ad-{}">Test Advertisement</div>"#,
                self.placement.position
            ),
        };
        if !self.host.insert_unit(&unit, &content) {
            warn!("Host could not insert placement unit {}", slot_id);
        }

        let deadline = tokio::time::sleep(duration);
        tokio::pin!(deadline);

        loop {
            tokio::select! {
                _ = &mut deadline => break,
                Some(event) = events.recv() => {
                    if event.ratio >= self.threshold {
                        self.optimizer.record_impression(&slot_id);
                    }
                }
            }
        }

        self.observer.release(&slot_id);
        self.optimizer.conclude(&slot_id);
    }
}
