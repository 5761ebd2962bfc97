use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::debug;

use crate::api::ApiError;
use crate::state::same_wallet;
use crate::types::LeaderboardEntry;

/// The three independently loaded panels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PanelKind {
    Leaderboard,
    Positions,
    Activity,
}

impl PanelKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Leaderboard => "leaderboard",
            Self::Positions => "positions",
            Self::Activity => "activity",
        }
    }
}

/// Load status of one panel.
#[derive(Debug, Clone, PartialEq)]
pub enum PanelStatus<T> {
    Idle,
    Loading,
    Populated(Vec<T>),
    Empty,
    Failed(String),
}

/// Identifies one issued load. Wallet-scoped panels also remember whose data
/// was requested.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    pub panel: PanelKind,
    pub seq: u64,
    pub wallet: Option<String>,
}

/// What `Panel::finish` did with a completed load.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    /// Newer load already issued (or selection changed); result dropped.
    Stale,
    Populated(usize),
    Empty,
    Failed(ApiError),
}

/// Loader state machine: `Idle -> Loading -> {Populated | Empty | Failed}`.
///
/// Re-entrant: a new load may start from any state. Only the most recently
/// issued ticket may complete it, so a slow superseded request can never
/// overwrite a fresher result.
#[derive(Debug)]
pub struct Panel<T> {
    kind: PanelKind,
    status: PanelStatus<T>,
    issued: u64,
    wallet: Option<String>,
}

impl<T> Panel<T> {
    pub fn new(kind: PanelKind) -> Self {
        Self {
            kind,
            status: PanelStatus::Idle,
            issued: 0,
            wallet: None,
        }
    }

    pub fn status(&self) -> &PanelStatus<T> {
        &self.status
    }

    pub fn items(&self) -> &[T] {
        match &self.status {
            PanelStatus::Populated(items) => items,
            _ => &[],
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.status, PanelStatus::Loading)
    }

    /// Enter `Loading`, discarding whatever was displayed.
    pub fn begin_load(&mut self, wallet: Option<&str>) -> LoadTicket {
        self.issued += 1;
        self.wallet = wallet.map(str::to_string);
        self.status = PanelStatus::Loading;
        LoadTicket {
            panel: self.kind,
            seq: self.issued,
            wallet: self.wallet.clone(),
        }
    }

    fn is_current(&self, ticket: &LoadTicket) -> bool {
        if ticket.panel != self.kind || ticket.seq != self.issued {
            return false;
        }
        match (&ticket.wallet, &self.wallet) {
            (Some(a), Some(b)) => same_wallet(a, b),
            (None, None) => true,
            _ => false,
        }
    }

    /// Apply a completed load if its ticket is still the current one.
    pub fn finish(&mut self, ticket: &LoadTicket, result: Result<Vec<T>, ApiError>) -> LoadOutcome {
        if !self.is_current(ticket) {
            debug!(
                "Dropping stale {} result (seq {} < {})",
                self.kind.label(),
                ticket.seq,
                self.issued
            );
            return LoadOutcome::Stale;
        }
        match result {
            Ok(items) if items.is_empty() => {
                self.status = PanelStatus::Empty;
                LoadOutcome::Empty
            }
            Ok(items) => {
                let count = items.len();
                self.status = PanelStatus::Populated(items);
                LoadOutcome::Populated(count)
            }
            Err(err) => {
                self.status = PanelStatus::Failed(err.to_string());
                LoadOutcome::Failed(err)
            }
        }
    }
}

/// Headline numbers derived from one leaderboard page.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardSummary {
    pub top_pnl: Decimal,
    pub total_volume: Decimal,
    pub mean_pnl: Decimal,
    pub computed_at: DateTime<Utc>,
}

impl LeaderboardSummary {
    /// `None` for an empty page: there is no top entry or mean.
    pub fn compute(entries: &[LeaderboardEntry], now: DateTime<Utc>) -> Option<Self> {
        let top = entries.first()?;
        let total_volume = entries
            .iter()
            .fold(Decimal::ZERO, |acc, e| acc.saturating_add(e.volume()));
        let total_pnl = entries
            .iter()
            .fold(Decimal::ZERO, |acc, e| acc.saturating_add(e.pnl()));
        Some(Self {
            top_pnl: top.pnl(),
            total_volume,
            mean_pnl: total_pnl / Decimal::from(entries.len()),
            computed_at: now,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn failure() -> ApiError {
        ApiError::RequestFailed {
            url: "https://data-api.polymarket.com/activity".to_string(),
            reason: "HTTP 503 Service Unavailable".to_string(),
        }
    }

    #[test]
    fn starts_idle_and_enters_loading() {
        let mut panel: Panel<u32> = Panel::new(PanelKind::Leaderboard);
        assert_eq!(panel.status(), &PanelStatus::Idle);
        let ticket = panel.begin_load(None);
        assert_eq!(ticket.seq, 1);
        assert!(panel.is_loading());
    }

    #[test]
    fn empty_success_is_not_failure() {
        let mut panel: Panel<u32> = Panel::new(PanelKind::Positions);
        let ticket = panel.begin_load(Some("0xabc"));
        assert_eq!(panel.finish(&ticket, Ok(vec![])), LoadOutcome::Empty);
        assert_eq!(panel.status(), &PanelStatus::Empty);
    }

    #[test]
    fn failure_then_reload_recovers() {
        let mut panel: Panel<u32> = Panel::new(PanelKind::Activity);
        let first = panel.begin_load(Some("0xabc"));
        assert!(matches!(
            panel.finish(&first, Err(failure())),
            LoadOutcome::Failed(_)
        ));
        assert!(matches!(panel.status(), PanelStatus::Failed(msg) if msg.contains("503")));

        let second = panel.begin_load(Some("0xabc"));
        assert!(panel.is_loading());
        assert_eq!(panel.finish(&second, Ok(vec![1, 2])), LoadOutcome::Populated(2));
        assert_eq!(panel.items(), &[1, 2]);
    }

    #[test]
    fn last_issued_wins_over_last_completed() {
        let mut panel: Panel<u32> = Panel::new(PanelKind::Leaderboard);
        let older = panel.begin_load(None);
        let newer = panel.begin_load(None);

        assert_eq!(panel.finish(&newer, Ok(vec![2])), LoadOutcome::Populated(1));
        // The older request resolves afterwards and must not clobber it.
        assert_eq!(panel.finish(&older, Ok(vec![1])), LoadOutcome::Stale);
        assert_eq!(panel.finish(&older, Err(failure())), LoadOutcome::Stale);
        assert_eq!(panel.items(), &[2]);
    }

    #[test]
    fn results_for_previous_wallet_are_dropped() {
        let mut panel: Panel<u32> = Panel::new(PanelKind::Positions);
        let for_a = panel.begin_load(Some("0xaaaa"));
        let _for_b = panel.begin_load(Some("0xbbbb"));
        assert_eq!(panel.finish(&for_a, Ok(vec![9])), LoadOutcome::Stale);
        assert!(panel.is_loading());
    }

    #[test]
    fn ticket_for_another_panel_is_rejected() {
        let mut positions: Panel<u32> = Panel::new(PanelKind::Positions);
        let mut activity: Panel<u32> = Panel::new(PanelKind::Activity);
        let ticket = activity.begin_load(Some("0xabc"));
        positions.begin_load(Some("0xabc"));
        assert_eq!(positions.finish(&ticket, Ok(vec![1])), LoadOutcome::Stale);
        assert_eq!(activity.finish(&ticket, Ok(vec![1])), LoadOutcome::Populated(1));
    }

    #[test]
    fn summary_statistics() {
        let entries: Vec<LeaderboardEntry> = serde_json::from_value(json!([
            { "proxyWallet": "0x1", "pnl": 300, "vol": 1000 },
            { "proxyWallet": "0x2", "pnl": 100, "vol": "500.5" },
            { "proxyWallet": "0x3", "pnl": -100 }
        ]))
        .unwrap();
        let now = Utc::now();
        let summary = LeaderboardSummary::compute(&entries, now).unwrap();
        assert_eq!(summary.top_pnl, dec!(300));
        assert_eq!(summary.total_volume, dec!(1500.5));
        assert_eq!(summary.mean_pnl, dec!(100));
        assert!(LeaderboardSummary::compute(&[], now).is_none());
    }

    #[test]
    fn summary_saturates_on_huge_values() {
        let mut entries: Vec<LeaderboardEntry> = serde_json::from_value(json!([
            { "proxyWallet": "0x1", "pnl": 1, "vol": 1 },
            { "proxyWallet": "0x2", "pnl": 1, "vol": 1 }
        ]))
        .unwrap();
        entries[0].vol = Some(Decimal::MAX);
        entries[1].vol = Some(Decimal::MAX);
        let summary = LeaderboardSummary::compute(&entries, Utc::now()).unwrap();
        assert_eq!(summary.total_volume, Decimal::MAX);
        assert_eq!(summary.mean_pnl, dec!(1));
    }
}
