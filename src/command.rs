//! User actions, parsed from one line of input each.
//!
//! ```text
//! select <wallet> [name...]     select a trader directly
//! shortcut <name>               select a configured smart-money trader
//! search <address or name>      resolve and select
//! filter <category|period|order> <value>
//! refresh                       reload the leaderboard
//! auto <on|off>                 toggle periodic refresh
//! copy                          copy the selected wallet address
//! quit
//! ```

use std::str::FromStr;

use crate::types::{FilterChange, UnknownFilterValue};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Select { wallet: String, name: Option<String> },
    Shortcut(String),
    Search(String),
    Filter(FilterChange),
    Refresh,
    AutoRefresh(bool),
    Copy,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    #[error("empty command")]
    Empty,
    #[error("unknown command {0:?}")]
    Unknown(String),
    #[error("{0} needs an argument")]
    MissingArgument(&'static str),
    #[error("unknown filter dimension {0:?} (expected category, period or order)")]
    UnknownDimension(String),
    #[error(transparent)]
    FilterValue(#[from] UnknownFilterValue),
    #[error("expected on or off, got {0:?}")]
    Toggle(String),
}

fn parse_toggle(s: &str) -> Result<bool, CommandError> {
    match s.to_ascii_lowercase().as_str() {
        "on" | "true" | "1" | "enable" => Ok(true),
        "off" | "false" | "0" | "disable" => Ok(false),
        _ => Err(CommandError::Toggle(s.to_string())),
    }
}

fn parse_filter(rest: &str) -> Result<FilterChange, CommandError> {
    let mut parts = rest.split_whitespace();
    let dimension = parts.next().ok_or(CommandError::MissingArgument("filter"))?;
    let value = parts.next().ok_or(CommandError::MissingArgument("filter"))?;
    let change = match dimension.to_ascii_lowercase().as_str() {
        "category" | "cat" => FilterChange::Category(value.parse()?),
        "period" | "time" | "timeperiod" => FilterChange::TimePeriod(value.parse()?),
        "order" | "orderby" | "sort" => FilterChange::OrderBy(value.parse()?),
        other => return Err(CommandError::UnknownDimension(other.to_string())),
    };
    Ok(change)
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (verb, rest) = match line.split_once(char::is_whitespace) {
            Some((verb, rest)) => (verb, rest.trim()),
            None => (line, ""),
        };
        let need = |name: &'static str| {
            if rest.is_empty() {
                Err(CommandError::MissingArgument(name))
            } else {
                Ok(rest.to_string())
            }
        };

        match verb.to_ascii_lowercase().as_str() {
            "" => Err(CommandError::Empty),
            "select" => {
                let arg = need("select")?;
                let (wallet, name) = match arg.split_once(char::is_whitespace) {
                    Some((wallet, name)) => (wallet.to_string(), Some(name.trim().to_string())),
                    None => (arg, None),
                };
                Ok(Self::Select { wallet, name })
            }
            "shortcut" | "sm" => need("shortcut").map(Self::Shortcut),
            "search" | "find" => need("search").map(Self::Search),
            "filter" => parse_filter(rest).map(Self::Filter),
            "refresh" | "r" => Ok(Self::Refresh),
            "auto" => parse_toggle(&need("auto")?).map(Self::AutoRefresh),
            "copy" => Ok(Self::Copy),
            "quit" | "exit" | "q" => Ok(Self::Quit),
            other => Err(CommandError::Unknown(other.to_string())),
        }
    }
}
