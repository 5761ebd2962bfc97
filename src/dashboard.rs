use std::ops::ControlFlow;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, info, warn};

use crate::api::{ApiError, DataSource};
use crate::command::Command;
use crate::config::{AppConfig, SmartMoney};
use crate::format::short_address;
use crate::notify::{Level, Notification, Notifier};
use crate::panel::{LeaderboardSummary, LoadOutcome, LoadTicket, Panel, PanelKind};
use crate::scheduler::RefreshScheduler;
use crate::state::{SearchError, ViewState};
use crate::types::{ActivityRecord, FilterChange, LeaderboardEntry, Position, ViewFilters};
use crate::view::{self, PanelBody, UiUpdate};

/// Everything the event loop reacts to.
#[derive(Debug)]
pub enum Event {
    Command(Command),
    LeaderboardLoaded {
        ticket: LoadTicket,
        result: Result<Vec<LeaderboardEntry>, ApiError>,
    },
    PositionsLoaded {
        ticket: LoadTicket,
        result: Result<Vec<Position>, ApiError>,
    },
    ActivityLoaded {
        ticket: LoadTicket,
        result: Result<Vec<ActivityRecord>, ApiError>,
    },
    RefreshTick,
    Dismiss(u64),
}

/// Startup parameters for a `Dashboard`.
#[derive(Debug, Clone)]
pub struct DashboardOptions {
    pub filters: ViewFilters,
    pub auto_refresh: bool,
    pub refresh_interval: Duration,
    pub notification_ttl: Duration,
    pub shortcuts: Vec<SmartMoney>,
}

impl DashboardOptions {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            filters: ViewFilters::default(),
            auto_refresh: config.settings.auto_refresh,
            refresh_interval: config.settings.refresh_interval(),
            notification_ttl: config.settings.notification_ttl(),
            shortcuts: config.shortcuts().cloned().collect(),
        }
    }
}

impl Default for DashboardOptions {
    fn default() -> Self {
        Self::from_config(&AppConfig::default())
    }
}

/// Owns all view state and the three panels; the only place state changes.
///
/// Loads run as spawned tasks that post their results back as `Event`s, so
/// every mutation happens on the loop that calls `handle`.
pub struct Dashboard<S: DataSource> {
    source: Arc<S>,
    tx: UnboundedSender<Event>,
    state: ViewState,
    leaderboard: Panel<LeaderboardEntry>,
    positions: Panel<Position>,
    activity: Panel<ActivityRecord>,
    summary: Option<LeaderboardSummary>,
    last_updated: Option<DateTime<Utc>>,
    notifier: Notifier,
    scheduler: RefreshScheduler<Event>,
    shortcuts: Vec<SmartMoney>,
    outbox: Vec<UiUpdate>,
}

impl<S: DataSource> Dashboard<S> {
    /// Build a dashboard and the receiver its event loop should drain.
    pub fn new(source: Arc<S>, options: DashboardOptions) -> (Self, UnboundedReceiver<Event>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let dashboard = Self {
            source,
            tx,
            state: ViewState::new(options.filters, options.auto_refresh),
            leaderboard: Panel::new(PanelKind::Leaderboard),
            positions: Panel::new(PanelKind::Positions),
            activity: Panel::new(PanelKind::Activity),
            summary: None,
            last_updated: None,
            notifier: Notifier::new(options.notification_ttl),
            scheduler: RefreshScheduler::new(options.refresh_interval, || Event::RefreshTick),
            shortcuts: options.shortcuts,
            outbox: Vec::new(),
        };
        (dashboard, rx)
    }

    /// Handle for feeding commands from outside the loop.
    pub fn sender(&self) -> UnboundedSender<Event> {
        self.tx.clone()
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn leaderboard(&self) -> &Panel<LeaderboardEntry> {
        &self.leaderboard
    }

    pub fn positions(&self) -> &Panel<Position> {
        &self.positions
    }

    pub fn activity(&self) -> &Panel<ActivityRecord> {
        &self.activity
    }

    pub fn summary(&self) -> Option<&LeaderboardSummary> {
        self.summary.as_ref()
    }

    pub fn last_updated(&self) -> Option<DateTime<Utc>> {
        self.last_updated
    }

    pub fn notifications(&self) -> &[Notification] {
        self.notifier.live()
    }

    pub fn auto_refresh_running(&self) -> bool {
        self.scheduler.is_enabled()
    }

    pub fn shortcuts(&self) -> &[SmartMoney] {
        &self.shortcuts
    }

    /// Updates produced since the last call.
    pub fn take_updates(&mut self) -> Vec<UiUpdate> {
        std::mem::take(&mut self.outbox)
    }

    /// Initial render, first leaderboard load, and auto-refresh if enabled.
    pub fn start(&mut self) {
        self.push(UiUpdate::Region {
            region: self.state.region,
        });
        self.push(UiUpdate::Filters {
            filters: self.state.filters,
        });
        self.push(UiUpdate::Shortcuts {
            shortcuts: self
                .shortcuts
                .iter()
                .filter(|s| !s.address.is_empty())
                .cloned()
                .collect(),
        });
        if self.state.auto_refresh {
            self.scheduler.enable(self.tx.clone());
        }
        self.push(UiUpdate::AutoRefresh {
            enabled: self.state.auto_refresh,
        });
        self.load_leaderboard();
    }

    /// Drain events until `Quit`, handing every update to `emit`.
    pub async fn run(mut self, mut rx: UnboundedReceiver<Event>, mut emit: impl FnMut(UiUpdate)) {
        self.take_updates().into_iter().for_each(&mut emit);
        while let Some(event) = rx.recv().await {
            let flow = self.handle(event);
            self.take_updates().into_iter().for_each(&mut emit);
            if flow.is_break() {
                break;
            }
        }
        self.scheduler.disable();
        info!("Dashboard stopped");
    }

    pub fn handle(&mut self, event: Event) -> ControlFlow<()> {
        match event {
            Event::Command(cmd) => return self.dispatch(cmd),
            Event::LeaderboardLoaded { ticket, result } => self.on_leaderboard(&ticket, result),
            Event::PositionsLoaded { ticket, result } => self.on_positions(&ticket, result),
            Event::ActivityLoaded { ticket, result } => self.on_activity(&ticket, result),
            Event::RefreshTick => self.on_tick(),
            Event::Dismiss(id) => {
                if self.notifier.dismiss(id) {
                    self.push(UiUpdate::Dismiss { id });
                }
            }
        }
        ControlFlow::Continue(())
    }

    /// User action -> state transition.
    pub fn dispatch(&mut self, cmd: Command) -> ControlFlow<()> {
        match cmd {
            Command::Select { wallet, name } => self.select_user(&wallet, name.as_deref()),
            Command::Shortcut(name) => self.select_shortcut(&name),
            Command::Search(text) => self.search(&text),
            Command::Filter(change) => self.change_filter(change),
            Command::Refresh => self.load_leaderboard(),
            Command::AutoRefresh(enabled) => self.set_auto_refresh(enabled),
            Command::Copy => self.copy_address(),
            Command::Quit => return ControlFlow::Break(()),
        }
        ControlFlow::Continue(())
    }

    fn push(&mut self, update: UiUpdate) {
        self.outbox.push(update);
    }

    fn notify(&mut self, level: Level, message: impl Into<String>) {
        let notification = self.notifier.raise(level, message);
        let id = notification.id;
        let ttl = self.notifier.ttl();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(ttl).await;
            tx.send(Event::Dismiss(id)).ok();
        });
        self.push(UiUpdate::Notify { notification });
    }

    fn push_leaderboard(&mut self) {
        let body = view::leaderboard_body(&self.leaderboard, &self.state);
        self.push(UiUpdate::Leaderboard { body });
    }

    fn push_positions(&mut self, wallet: String) {
        let body = view::positions_body(&self.positions);
        self.push(UiUpdate::Positions { wallet, body });
    }

    fn push_activity(&mut self, wallet: String) {
        let body = view::activity_body(&self.activity, Utc::now());
        self.push(UiUpdate::Activity { wallet, body });
    }

    fn load_leaderboard(&mut self) {
        let filters = self.state.filters;
        let ticket = self.leaderboard.begin_load(None);
        info!(
            "Loading leaderboard (category={} period={} order={})",
            filters.category, filters.time_period, filters.order_by
        );
        self.push(UiUpdate::Leaderboard {
            body: PanelBody::Loading,
        });

        let source = Arc::clone(&self.source);
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = source.fetch_leaderboard(filters).await;
            tx.send(Event::LeaderboardLoaded { ticket, result }).ok();
        });
    }

    fn load_positions(&mut self, wallet: &str) {
        let ticket = self.positions.begin_load(Some(wallet));
        self.push(UiUpdate::Positions {
            wallet: wallet.to_string(),
            body: PanelBody::Loading,
        });

        let source = Arc::clone(&self.source);
        let tx = self.tx.clone();
        let wallet = wallet.to_string();
        tokio::spawn(async move {
            let result = source.fetch_positions(&wallet).await;
            tx.send(Event::PositionsLoaded { ticket, result }).ok();
        });
    }

    fn load_activity(&mut self, wallet: &str) {
        let ticket = self.activity.begin_load(Some(wallet));
        self.push(UiUpdate::Activity {
            wallet: wallet.to_string(),
            body: PanelBody::Loading,
        });

        let source = Arc::clone(&self.source);
        let tx = self.tx.clone();
        let wallet = wallet.to_string();
        tokio::spawn(async move {
            let result = source.fetch_activity(&wallet).await;
            tx.send(Event::ActivityLoaded { ticket, result }).ok();
        });
    }

    fn on_leaderboard(&mut self, ticket: &LoadTicket, result: Result<Vec<LeaderboardEntry>, ApiError>) {
        match self.leaderboard.finish(ticket, result) {
            LoadOutcome::Stale => return,
            LoadOutcome::Populated(count) => {
                info!("Leaderboard loaded ({count} traders)");
                let now = Utc::now();
                self.state.replace_leaderboard(self.leaderboard.items().to_vec());
                self.summary = LeaderboardSummary::compute(&self.state.leaderboard, now);
                self.last_updated = Some(now);
                if let Some(summary) = &self.summary {
                    let summary = view::summary_view(summary);
                    self.push(UiUpdate::Summary { summary });
                }
                self.push(UiUpdate::LastUpdated { at: now });
            }
            LoadOutcome::Empty => {
                info!("Leaderboard loaded (empty)");
                let now = Utc::now();
                self.state.replace_leaderboard(Vec::new());
                self.last_updated = Some(now);
                self.push(UiUpdate::LastUpdated { at: now });
            }
            LoadOutcome::Failed(err) => {
                warn!("Failed to load leaderboard: {err}");
                self.notify(
                    Level::Error,
                    "Leaderboard failed to load, check your network connection",
                );
            }
        }
        self.push_leaderboard();
    }

    fn on_positions(&mut self, ticket: &LoadTicket, result: Result<Vec<Position>, ApiError>) {
        let wallet = ticket.wallet.clone().unwrap_or_default();
        match self.positions.finish(ticket, result) {
            LoadOutcome::Stale => return,
            LoadOutcome::Populated(count) => {
                info!("Loaded {count} position(s) for {}", short_address(&wallet));
            }
            LoadOutcome::Empty => {
                info!("No active positions for {}", short_address(&wallet));
            }
            LoadOutcome::Failed(err) => {
                warn!("Failed to load positions for {wallet}: {err}");
                self.notify(Level::Error, "Positions failed to load");
            }
        }
        self.push_positions(wallet);
    }

    fn on_activity(&mut self, ticket: &LoadTicket, result: Result<Vec<ActivityRecord>, ApiError>) {
        let wallet = ticket.wallet.clone().unwrap_or_default();
        match self.activity.finish(ticket, result) {
            LoadOutcome::Stale => return,
            LoadOutcome::Populated(count) => {
                info!("Loaded {count} activity record(s) for {}", short_address(&wallet));
            }
            LoadOutcome::Empty => {
                info!("No activity for {}", short_address(&wallet));
            }
            LoadOutcome::Failed(err) => {
                warn!("Failed to load activity for {wallet}: {err}");
                self.notify(Level::Error, "Activity failed to load");
            }
        }
        self.push_activity(wallet);
    }

    fn on_tick(&mut self) {
        debug!("Auto-refresh tick");
        self.load_leaderboard();
        if let Some(wallet) = self.state.selected_wallet().map(str::to_string) {
            self.load_positions(&wallet);
            self.load_activity(&wallet);
        }
    }

    /// Select a trader and load both wallet panels, even if already selected.
    fn select_user(&mut self, wallet: &str, name: Option<&str>) {
        let card = view::user_card(self.state.select_user(wallet, name));
        info!("Selected {} ({})", card.name, short_address(wallet));
        self.push(UiUpdate::Region {
            region: self.state.region,
        });
        self.push(UiUpdate::UserCard { card });
        self.push_leaderboard();
        self.load_positions(wallet);
        self.load_activity(wallet);
    }

    fn select_shortcut(&mut self, name: &str) {
        let found = self
            .shortcuts
            .iter()
            .find(|s| s.name.eq_ignore_ascii_case(name.trim()) && !s.address.is_empty())
            .map(|s| (s.address.clone(), s.name.clone()));
        match found {
            Some((address, name)) => self.select_user(&address, Some(&name)),
            None => self.notify(Level::Error, format!("No smart-money shortcut named {name:?}")),
        }
    }

    fn change_filter(&mut self, change: FilterChange) {
        self.state.apply_filter(change);
        self.push(UiUpdate::Filters {
            filters: self.state.filters,
        });
        self.load_leaderboard();
    }

    fn search(&mut self, text: &str) {
        match self.state.resolve_search(text) {
            Ok(hit) => {
                self.select_user(&hit.wallet, hit.display_name.as_deref());
                if hit.by_address {
                    self.notify(Level::Info, "Looking up wallet…");
                }
            }
            Err(err @ SearchError::Empty) => self.notify(Level::Info, err.to_string()),
            Err(err @ SearchError::NotFound(_)) => {
                debug!("Search miss: {err}");
                self.notify(Level::Error, err.to_string());
            }
        }
    }

    fn copy_address(&mut self) {
        let Some(wallet) = self.state.selected_wallet().map(str::to_string) else {
            debug!("Copy requested with no trader selected");
            return;
        };
        self.push(UiUpdate::Clipboard { text: wallet });
        self.notify(Level::Success, "Address copied to clipboard");
    }

    fn set_auto_refresh(&mut self, enabled: bool) {
        self.state.auto_refresh = enabled;
        if enabled {
            self.scheduler.enable(self.tx.clone());
        } else {
            self.scheduler.disable();
        }
        self.push(UiUpdate::AutoRefresh { enabled });
    }
}
