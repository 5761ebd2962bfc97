//! Display formatting for amounts, addresses and timestamps.

use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

/// Placeholder shown for missing values.
pub const PLACEHOLDER: &str = "—";

const MILLION: Decimal = dec!(1000000);
const THOUSAND: Decimal = dec!(1000);

fn fixed(value: Decimal, dp: u32) -> String {
    let rounded = value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero);
    format!("{rounded:.prec$}", prec = dp as usize)
}

/// Abbreviate a non-negative magnitude: `2.50M`, `1.5K`, `999.00`.
fn abbreviate(magnitude: Decimal) -> String {
    if magnitude >= MILLION {
        format!("{}M", fixed(magnitude / MILLION, 2))
    } else if magnitude >= THOUSAND {
        format!("{}K", fixed(magnitude / THOUSAND, 1))
    } else {
        fixed(magnitude, 2)
    }
}

/// Signed dollar amount for PnL: `+$2.50M`, `-$1.5K`, `+$0.00`.
pub fn format_pnl(value: Decimal) -> String {
    let sign = if value.is_sign_negative() && !value.is_zero() {
        "-"
    } else {
        "+"
    };
    format!("{sign}${}", abbreviate(value.abs()))
}

/// Unsigned dollar amount for volumes and values: `$2.50M`, `$1.5K`.
pub fn format_volume(value: Decimal) -> String {
    if value.is_sign_negative() && !value.is_zero() {
        return format!("-${}", abbreviate(value.abs()));
    }
    format!("${}", abbreviate(value))
}

/// Truncate a wallet address to `0x1234…abcd`.
pub fn short_address(addr: &str) -> String {
    if addr.is_empty() {
        return PLACEHOLDER.to_string();
    }
    let chars: Vec<char> = addr.chars().collect();
    if chars.len() < 10 {
        return addr.to_string();
    }
    let head: String = chars[..6].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}…{tail}")
}

/// Relative age of `at` measured from `now`.
pub fn time_ago(at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let secs = (now - at).num_seconds().max(0);
    match secs {
        s if s < 60 => format!("{s}s ago"),
        s if s < 3_600 => format!("{}m ago", s / 60),
        s if s < 86_400 => format!("{}h ago", s / 3_600),
        s => format!("{}d ago", s / 86_400),
    }
}

pub fn format_rank(rank: Option<u32>) -> String {
    match rank {
        Some(r) if r > 0 => format!("#{r}"),
        _ => PLACEHOLDER.to_string(),
    }
}

/// Price to three decimals: `$0.655`.
pub fn format_price(price: Decimal) -> String {
    format!("${}", fixed(price, 3))
}

/// Share count to one decimal: `1520.4`.
pub fn format_size(size: Decimal) -> String {
    fixed(size, 1)
}
