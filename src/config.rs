use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::DATA_API_BASE;

/// Default config file path.
pub const CONFIG_PATH: &str = "config.toml";

/// Top-level application config deserialized from `config.toml`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub settings: SettingsConfig,
    /// Quick-select traders. Entries without an address are not offered.
    #[serde(default = "default_smart_money")]
    pub smart_money: Vec<SmartMoney>,
}

/// Upstream endpoint settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_data_api_base")]
    pub data_api_base: String,
    /// Per-request timeout. Unset means the transport default.
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

/// Runtime settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SettingsConfig {
    /// Auto-refresh period in seconds.
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval_secs: u64,
    /// Whether auto-refresh starts enabled.
    #[serde(default = "default_true")]
    pub auto_refresh: bool,
    /// How long a notification stays up.
    #[serde(default = "default_notification_ttl")]
    pub notification_ttl_secs: u64,
}

/// A curated trader shown as a one-click shortcut.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmartMoney {
    pub name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub tag: String,
}

fn default_data_api_base() -> String {
    DATA_API_BASE.to_string()
}

fn default_refresh_interval() -> u64 {
    60
}

fn default_true() -> bool {
    true
}

fn default_notification_ttl() -> u64 {
    4
}

fn smart_money(name: &str, address: &str, tag: &str) -> SmartMoney {
    SmartMoney {
        name: name.to_string(),
        address: address.to_string(),
        tag: tag.to_string(),
    }
}

fn default_smart_money() -> Vec<SmartMoney> {
    vec![
        smart_money("Theo4", "", "88.9% win rate"),
        smart_money(
            "aenews2",
            "0x44c1dfe43260c94ed4f1d00de2e1f80fb113ebc1",
            "data-driven",
        ),
        smart_money(
            "YatSen",
            "0x5bffcf561bcae83af680ad600cb99f1184d6ffbe",
            "politics",
        ),
        smart_money(
            "ImJustKen",
            "0x9d84ce0306f8551e02efef1680475fc0f1dc1344",
            "#1 total profit",
        ),
        smart_money(
            "debased",
            "0x24c8cf69a0e0a17eee21f69d29752bfa32e823e1",
            "market making",
        ),
    ]
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            data_api_base: default_data_api_base(),
            request_timeout_secs: None,
        }
    }
}

impl Default for SettingsConfig {
    fn default() -> Self {
        Self {
            refresh_interval_secs: default_refresh_interval(),
            auto_refresh: default_true(),
            notification_ttl_secs: default_notification_ttl(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            settings: SettingsConfig::default(),
            smart_money: default_smart_money(),
        }
    }
}

impl SettingsConfig {
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs.max(1))
    }

    pub fn notification_ttl(&self) -> Duration {
        Duration::from_secs(self.notification_ttl_secs)
    }
}

impl ApiConfig {
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

impl AppConfig {
    /// Load config from the given TOML file path.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let config: Self = toml::from_str(&contents)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        Ok(config)
    }

    /// Like `load`, but a missing file yields the defaults.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if !path.exists() {
            info!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        Self::load(path)
    }

    /// Shortcuts that can actually be selected.
    pub fn shortcuts(&self) -> impl Iterator<Item = &SmartMoney> {
        self.smart_money.iter().filter(|s| !s.address.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_uses_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.settings.refresh_interval(), Duration::from_secs(60));
        assert_eq!(config.settings.notification_ttl(), Duration::from_secs(4));
        assert!(config.settings.auto_refresh);
        assert_eq!(config.api.data_api_base, DATA_API_BASE);
        assert_eq!(config.api.request_timeout(), None);
    }

    #[test]
    fn shortcuts_skip_entries_without_address() {
        let config = AppConfig::default();
        let names: Vec<&str> = config.shortcuts().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["aenews2", "YatSen", "ImJustKen", "debased"]);
    }

    #[test]
    fn partial_file_overrides_fields() {
        let config: AppConfig = toml::from_str(
            r#"
            [settings]
            refresh_interval_secs = 15
            auto_refresh = false

            [api]
            request_timeout_secs = 10

            [[smart_money]]
            name = "whale"
            address = "0x1111111111"
            "#,
        )
        .unwrap();
        assert_eq!(config.settings.refresh_interval_secs, 15);
        assert!(!config.settings.auto_refresh);
        assert_eq!(config.settings.notification_ttl_secs, 4);
        assert_eq!(config.api.request_timeout(), Some(Duration::from_secs(10)));
        assert_eq!(config.smart_money.len(), 1);
        assert_eq!(config.smart_money[0].tag, "");
    }

    #[test]
    fn missing_file_is_default_but_bad_file_errors() {
        let missing = std::env::temp_dir().join("smart-money-definitely-missing.toml");
        assert_eq!(
            AppConfig::load_or_default(&missing).unwrap(),
            AppConfig::default()
        );

        let bad = std::env::temp_dir().join(format!(
            "smart-money-bad-{}.toml",
            std::process::id()
        ));
        std::fs::write(&bad, "settings = 5").unwrap();
        let err = AppConfig::load_or_default(&bad).unwrap_err();
        std::fs::remove_file(&bad).ok();
        assert!(err.to_string().contains("failed to parse"));
    }
}
