//! Display models pushed to the front end. Built from state with the
//! formatters; carry no behaviour of their own.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::config::SmartMoney;
use crate::format::{
    PLACEHOLDER, format_pnl, format_price, format_rank, format_size, format_volume, short_address,
    time_ago,
};
use crate::notify::Notification;
use crate::panel::{LeaderboardSummary, Panel, PanelStatus};
use crate::state::{Region, SelectedUser, ViewState};
use crate::types::{
    ActivityKind, ActivityRecord, LeaderboardEntry, OutcomeSide, Position, ViewFilters,
};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardRow {
    pub rank: u32,
    pub wallet: String,
    pub name: String,
    pub short_address: String,
    pub avatar: Option<String>,
    pub pnl: String,
    pub positive: bool,
    pub volume: String,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionCard {
    pub title: String,
    pub side: OutcomeSide,
    pub size: String,
    pub price: String,
    pub value: String,
    pub pnl: String,
    pub positive: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityRow {
    pub kind: ActivityKind,
    pub title: String,
    pub subtitle: String,
    pub amount: String,
    pub age: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserCard {
    pub wallet: String,
    pub name: String,
    pub avatar: Option<String>,
    pub pnl: String,
    pub positive: bool,
    pub volume: String,
    pub rank: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryView {
    pub top_pnl: String,
    pub total_volume: String,
    pub mean_pnl: String,
}

/// Panel body: a placeholder or the full list.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", content = "items", rename_all = "lowercase")]
pub enum PanelBody<R> {
    Idle,
    Loading,
    Empty,
    Failed,
    Populated(Vec<R>),
}

/// One change to what the user sees.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "update", rename_all = "camelCase")]
pub enum UiUpdate {
    Region { region: Region },
    Filters { filters: ViewFilters },
    Shortcuts { shortcuts: Vec<SmartMoney> },
    Leaderboard { body: PanelBody<LeaderboardRow> },
    Summary { summary: SummaryView },
    LastUpdated { at: DateTime<Utc> },
    UserCard { card: UserCard },
    Positions { wallet: String, body: PanelBody<PositionCard> },
    Activity { wallet: String, body: PanelBody<ActivityRow> },
    AutoRefresh { enabled: bool },
    Notify { notification: Notification },
    Dismiss { id: u64 },
    Clipboard { text: String },
}

fn body<T, R>(panel: &Panel<T>, row: impl Fn(usize, &T) -> R) -> PanelBody<R> {
    match panel.status() {
        PanelStatus::Idle => PanelBody::Idle,
        PanelStatus::Loading => PanelBody::Loading,
        PanelStatus::Empty => PanelBody::Empty,
        PanelStatus::Failed(_) => PanelBody::Failed,
        PanelStatus::Populated(items) => {
            PanelBody::Populated(items.iter().enumerate().map(|(i, t)| row(i, t)).collect())
        }
    }
}

/// Leaderboard panel, with the selected trader's row marked active.
pub fn leaderboard_body(
    panel: &Panel<LeaderboardEntry>,
    state: &ViewState,
) -> PanelBody<LeaderboardRow> {
    let active = state.active_row();
    body(panel, |idx, entry| LeaderboardRow {
        rank: entry.rank_or(idx),
        wallet: entry.proxy_wallet.clone(),
        name: entry
            .display_name()
            .map(str::to_string)
            .unwrap_or_else(|| short_address(&entry.proxy_wallet)),
        short_address: short_address(&entry.proxy_wallet),
        avatar: entry.profile_image.clone().filter(|s| !s.is_empty()),
        pnl: format_pnl(entry.pnl()),
        positive: !entry.pnl().is_sign_negative(),
        volume: format_volume(entry.volume()),
        active: active == Some(idx),
    })
}

pub fn position_card(pos: &Position) -> PositionCard {
    let pnl = pos.unrealized_pnl();
    PositionCard {
        title: pos.market_title(),
        side: pos.side(),
        size: format_size(pos.size()),
        price: format_price(pos.current_price()),
        value: format_volume(pos.current_value()),
        pnl: format_pnl(pnl),
        positive: !pnl.is_sign_negative(),
    }
}

pub fn activity_row(act: &ActivityRecord, now: DateTime<Utc>) -> ActivityRow {
    let subtitle = match act.outcome.as_deref().filter(|o| !o.is_empty()) {
        Some(outcome) => format!("{} · {outcome}", act.label()),
        None => act.label().to_string(),
    };
    ActivityRow {
        kind: act.classify(),
        title: act.market_title().to_string(),
        subtitle,
        amount: act
            .amount()
            .map(format_volume)
            .unwrap_or_else(|| PLACEHOLDER.to_string()),
        age: act
            .occurred_at()
            .map(|at| time_ago(at, now))
            .unwrap_or_default(),
    }
}

pub fn positions_body(panel: &Panel<Position>) -> PanelBody<PositionCard> {
    body(panel, |_, pos| position_card(pos))
}

pub fn activity_body(panel: &Panel<ActivityRecord>, now: DateTime<Utc>) -> PanelBody<ActivityRow> {
    body(panel, |_, act| activity_row(act, now))
}

pub fn user_card(user: &SelectedUser) -> UserCard {
    let pnl = user.entry.as_ref().map(|e| e.pnl()).unwrap_or_default();
    UserCard {
        wallet: user.wallet.clone(),
        name: user
            .name()
            .map(str::to_string)
            .unwrap_or_else(|| short_address(&user.wallet)),
        avatar: user
            .entry
            .as_ref()
            .and_then(|e| e.profile_image.clone())
            .filter(|s| !s.is_empty()),
        pnl: format_pnl(pnl),
        positive: !pnl.is_sign_negative(),
        volume: format_volume(user.entry.as_ref().map(|e| e.volume()).unwrap_or_default()),
        rank: format_rank(user.entry.as_ref().and_then(|e| e.rank)),
    }
}

pub fn summary_view(summary: &LeaderboardSummary) -> SummaryView {
    SummaryView {
        top_pnl: format_pnl(summary.top_pnl),
        total_volume: format_volume(summary.total_volume),
        mean_pnl: format_pnl(summary.mean_pnl),
    }
}
