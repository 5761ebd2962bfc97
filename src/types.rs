use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One trader row from `GET /v1/leaderboard`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    /// Upstream rank. When absent the row's list position is used instead.
    #[serde(default, deserialize_with = "de::lenient_rank")]
    pub rank: Option<u32>,
    #[serde(default)]
    pub user_name: Option<String>,
    #[serde(default)]
    pub proxy_wallet: String,
    #[serde(default)]
    pub pnl: Option<Decimal>,
    #[serde(default)]
    pub vol: Option<Decimal>,
    #[serde(default)]
    pub profile_image: Option<String>,
}

impl LeaderboardEntry {
    pub fn pnl(&self) -> Decimal {
        self.pnl.unwrap_or_default()
    }

    pub fn volume(&self) -> Decimal {
        self.vol.unwrap_or_default()
    }

    /// Display name, ignoring empty strings.
    pub fn display_name(&self) -> Option<&str> {
        self.user_name.as_deref().filter(|n| !n.is_empty())
    }

    /// Rank for display, falling back to the 1-based list position.
    pub fn rank_or(&self, idx: usize) -> u32 {
        self.rank
            .filter(|r| *r > 0)
            .unwrap_or_else(|| u32::try_from(idx + 1).unwrap_or(u32::MAX))
    }
}

/// Binary outcome side of a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OutcomeSide {
    Yes,
    No,
}

/// One open position from `GET /positions`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub asset: Option<String>,
    #[serde(default)]
    pub outcome: Option<String>,
    #[serde(default)]
    pub size: Option<Decimal>,
    #[serde(default)]
    pub cur_price: Option<Decimal>,
    #[serde(default)]
    pub avg_price: Option<Decimal>,
    /// Some responses only carry a single `price`.
    #[serde(default)]
    pub price: Option<Decimal>,
}

impl Position {
    pub fn market_title(&self) -> String {
        match (&self.title, &self.asset) {
            (Some(title), _) if !title.is_empty() => title.clone(),
            (_, Some(asset)) => format!("Market {asset}"),
            _ => "Market".to_string(),
        }
    }

    pub fn side(&self) -> OutcomeSide {
        match self.outcome.as_deref() {
            Some("No") => OutcomeSide::No,
            _ => OutcomeSide::Yes,
        }
    }

    pub fn size(&self) -> Decimal {
        self.size.unwrap_or_default()
    }

    pub fn current_price(&self) -> Decimal {
        self.cur_price.or(self.price).unwrap_or_default()
    }

    pub fn average_price(&self) -> Decimal {
        self.avg_price.or(self.price).unwrap_or_default()
    }

    /// Saturates instead of overflowing on absurd upstream magnitudes.
    pub fn current_value(&self) -> Decimal {
        self.size().saturating_mul(self.current_price())
    }

    pub fn unrealized_pnl(&self) -> Decimal {
        self.size()
            .saturating_mul(self.current_price().saturating_sub(self.average_price()))
    }
}

/// Closed classification of activity records.
///
/// Upstream labels are matched as whole tokens; anything unrecognised lands in
/// `Other` and keeps its raw label for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityKind {
    Buy,
    Sell,
    Redeem,
    Other,
}

impl ActivityKind {
    pub fn classify(kind: &str, side: Option<&str>) -> Self {
        let kind = kind.trim().to_ascii_uppercase();
        let side = side.map(|s| s.trim().to_ascii_uppercase());
        match (kind.as_str(), side.as_deref()) {
            ("TRADE", Some("SELL")) => Self::Sell,
            ("TRADE", _) => Self::Buy,
            ("BUY", _) => Self::Buy,
            ("SELL", _) => Self::Sell,
            ("REDEEM" | "CLAIM", _) => Self::Redeem,
            _ => Self::Other,
        }
    }
}

/// One activity record from `GET /activity`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityRecord {
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub side: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub outcome: Option<String>,
    #[serde(default)]
    pub usdc_size: Option<Decimal>,
    #[serde(default)]
    pub value: Option<Decimal>,
    #[serde(default)]
    pub amount: Option<Decimal>,
    #[serde(default, deserialize_with = "de::timestamp")]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "de::timestamp")]
    pub created_at: Option<DateTime<Utc>>,
}

impl ActivityRecord {
    pub fn classify(&self) -> ActivityKind {
        ActivityKind::classify(self.kind.as_deref().unwrap_or(""), self.side.as_deref())
    }

    /// Raw upstream label, or "Trade" when missing.
    pub fn label(&self) -> &str {
        self.kind.as_deref().filter(|k| !k.is_empty()).unwrap_or("Trade")
    }

    pub fn market_title(&self) -> &str {
        self.title
            .as_deref()
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| self.label())
    }

    pub fn amount(&self) -> Option<Decimal> {
        self.usdc_size.or(self.value).or(self.amount)
    }

    pub fn occurred_at(&self) -> Option<DateTime<Utc>> {
        self.timestamp.or(self.created_at)
    }
}

/// Leaderboard category filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    #[default]
    Overall,
    Politics,
    Sports,
    Crypto,
    Culture,
    Mentions,
    Weather,
    Economics,
    Tech,
    Finance,
}

impl Category {
    pub const ALL: [Category; 10] = [
        Self::Overall,
        Self::Politics,
        Self::Sports,
        Self::Crypto,
        Self::Culture,
        Self::Mentions,
        Self::Weather,
        Self::Economics,
        Self::Tech,
        Self::Finance,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Overall => "OVERALL",
            Self::Politics => "POLITICS",
            Self::Sports => "SPORTS",
            Self::Crypto => "CRYPTO",
            Self::Culture => "CULTURE",
            Self::Mentions => "MENTIONS",
            Self::Weather => "WEATHER",
            Self::Economics => "ECONOMICS",
            Self::Tech => "TECH",
            Self::Finance => "FINANCE",
        }
    }
}

/// Leaderboard time window filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TimePeriod {
    Day,
    Week,
    Month,
    #[default]
    All,
}

impl TimePeriod {
    pub const ALL: [TimePeriod; 4] = [Self::Day, Self::Week, Self::Month, Self::All];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Day => "DAY",
            Self::Week => "WEEK",
            Self::Month => "MONTH",
            Self::All => "ALL",
        }
    }
}

/// Leaderboard ranking metric.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderBy {
    #[default]
    Pnl,
    Vol,
}

impl OrderBy {
    pub const ALL: [OrderBy; 2] = [Self::Pnl, Self::Vol];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pnl => "PNL",
            Self::Vol => "VOL",
        }
    }
}

/// Returned when a filter value is not one of the known wire strings.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {dimension} value: {value}")]
pub struct UnknownFilterValue {
    pub dimension: &'static str,
    pub value: String,
}

macro_rules! wire_enum_impls {
    ($ty:ty, $dimension:literal) => {
        impl FromStr for $ty {
            type Err = UnknownFilterValue;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let wanted = s.trim();
                <$ty>::ALL
                    .into_iter()
                    .find(|v| v.as_str().eq_ignore_ascii_case(wanted))
                    .ok_or_else(|| UnknownFilterValue {
                        dimension: $dimension,
                        value: wanted.to_string(),
                    })
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

wire_enum_impls!(Category, "category");
wire_enum_impls!(TimePeriod, "timePeriod");
wire_enum_impls!(OrderBy, "orderBy");

/// The three leaderboard filter dimensions; exactly one value each.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewFilters {
    pub category: Category,
    pub time_period: TimePeriod,
    pub order_by: OrderBy,
}

/// A change to exactly one filter dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterChange {
    Category(Category),
    TimePeriod(TimePeriod),
    OrderBy(OrderBy),
}

/// Lenient deserializers for fields whose upstream type varies.
mod de {
    use super::*;
    use chrono::TimeZone;
    use serde::Deserializer;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawNumberish {
        Int(i64),
        Float(f64),
        Text(String),
    }

    pub fn lenient_rank<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<RawNumberish> = Option::deserialize(deserializer)?;
        Ok(match raw {
            Some(RawNumberish::Int(n)) => u32::try_from(n).ok(),
            Some(RawNumberish::Float(n)) if n >= 0.0 && n <= f64::from(u32::MAX) => {
                Some(n as u32)
            }
            Some(RawNumberish::Float(_)) => None,
            Some(RawNumberish::Text(s)) => s.trim().parse().ok(),
            None => None,
        })
    }

    /// Accepts unix seconds, unix milliseconds, or RFC 3339 text.
    pub fn timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<RawNumberish> = Option::deserialize(deserializer)?;
        Ok(match raw {
            Some(RawNumberish::Int(n)) => from_unix(n),
            Some(RawNumberish::Float(n)) => from_unix(n as i64),
            Some(RawNumberish::Text(s)) => match s.trim().parse::<i64>() {
                Ok(n) => from_unix(n),
                Err(_) => DateTime::parse_from_rfc3339(s.trim())
                    .ok()
                    .map(|dt| dt.with_timezone(&Utc)),
            },
            None => None,
        })
    }

    fn from_unix(n: i64) -> Option<DateTime<Utc>> {
        if n > 1_000_000_000_000 {
            Utc.timestamp_millis_opt(n).single()
        } else {
            Utc.timestamp_opt(n, 0).single()
        }
    }
}
