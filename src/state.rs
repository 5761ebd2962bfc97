use serde::Serialize;

use crate::types::{FilterChange, LeaderboardEntry, ViewFilters};

/// Search terms with this prefix and at least `ADDRESS_MIN_LEN` characters
/// are taken as wallet addresses.
pub const ADDRESS_PREFIX: &str = "0x";
pub const ADDRESS_MIN_LEN: usize = 10;

/// Which main region of the dashboard is visible.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Region {
    #[default]
    Welcome,
    Detail,
}

/// The trader whose positions and activity are shown.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectedUser {
    pub wallet: String,
    pub display_name: Option<String>,
    /// Matching leaderboard row at selection time, if any.
    pub entry: Option<LeaderboardEntry>,
}

impl SelectedUser {
    /// Name shown on the user card: explicit name, then leaderboard name.
    pub fn name(&self) -> Option<&str> {
        self.display_name
            .as_deref()
            .filter(|n| !n.is_empty())
            .or_else(|| self.entry.as_ref().and_then(|e| e.display_name()))
    }
}

/// Where a search term resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    pub wallet: String,
    pub display_name: Option<String>,
    /// `true` when the term was taken as an address without any lookup.
    pub by_address: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SearchError {
    #[error("enter a wallet address or trader name")]
    Empty,
    #[error("no trader named {0:?} on the current leaderboard; enter the full wallet address")]
    NotFound(String),
}

pub fn same_wallet(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b)
}

/// Everything the dashboard shows that is not a panel's load status.
///
/// Owned by the event loop and only changed through the methods below.
#[derive(Debug, Default)]
pub struct ViewState {
    pub filters: ViewFilters,
    pub leaderboard: Vec<LeaderboardEntry>,
    pub selected: Option<SelectedUser>,
    pub region: Region,
    pub auto_refresh: bool,
}

impl ViewState {
    pub fn new(filters: ViewFilters, auto_refresh: bool) -> Self {
        Self {
            filters,
            auto_refresh,
            ..Self::default()
        }
    }

    /// Replace the current selection and switch to the detail region.
    ///
    /// The leaderboard row for the wallet, if present, is merged in.
    pub fn select_user(&mut self, wallet: &str, display_name: Option<&str>) -> &SelectedUser {
        let entry = self
            .leaderboard
            .iter()
            .find(|e| same_wallet(&e.proxy_wallet, wallet))
            .cloned();
        self.region = Region::Detail;
        self.selected.insert(SelectedUser {
            wallet: wallet.to_string(),
            display_name: display_name.filter(|n| !n.is_empty()).map(str::to_string),
            entry,
        })
    }

    pub fn selected_wallet(&self) -> Option<&str> {
        self.selected.as_ref().map(|u| u.wallet.as_str())
    }

    pub fn is_selected(&self, wallet: &str) -> bool {
        self.selected_wallet()
            .is_some_and(|selected| same_wallet(selected, wallet))
    }

    /// Change one filter dimension, leaving the other two alone.
    pub fn apply_filter(&mut self, change: FilterChange) {
        match change {
            FilterChange::Category(v) => self.filters.category = v,
            FilterChange::TimePeriod(v) => self.filters.time_period = v,
            FilterChange::OrderBy(v) => self.filters.order_by = v,
        }
    }

    /// Swap in a freshly loaded leaderboard page. No merge with the old one.
    pub fn replace_leaderboard(&mut self, entries: Vec<LeaderboardEntry>) {
        self.leaderboard = entries;
    }

    /// Index of the leaderboard row highlighted for the current selection.
    pub fn active_row(&self) -> Option<usize> {
        let wallet = self.selected_wallet()?;
        self.leaderboard
            .iter()
            .position(|e| same_wallet(&e.proxy_wallet, wallet))
    }

    /// Resolve free text to a wallet.
    ///
    /// Address-shaped input is accepted as-is. Anything else must match a
    /// display name on the loaded leaderboard (case-insensitive).
    pub fn resolve_search(&self, input: &str) -> Result<SearchHit, SearchError> {
        let term = input.trim();
        if term.is_empty() {
            return Err(SearchError::Empty);
        }
        if term.starts_with(ADDRESS_PREFIX) && term.chars().count() >= ADDRESS_MIN_LEN {
            return Ok(SearchHit {
                wallet: term.to_string(),
                display_name: None,
                by_address: true,
            });
        }
        let lowered = term.to_lowercase();
        self.leaderboard
            .iter()
            .find(|e| e.display_name().is_some_and(|n| n.to_lowercase() == lowered))
            .map(|e| SearchHit {
                wallet: e.proxy_wallet.clone(),
                display_name: e.display_name().map(str::to_string),
                by_address: false,
            })
            .ok_or_else(|| SearchError::NotFound(term.to_string()))
    }
}
