pub mod api;
pub mod command;
pub mod config;
pub mod dashboard;
pub mod format;
pub mod notify;
pub mod panel;
pub mod reporter;
pub mod scheduler;
pub mod state;
pub mod types;
pub mod view;

/// Polymarket data API base URL (public, no auth required)
pub const DATA_API_BASE: &str = "https://data-api.polymarket.com";
