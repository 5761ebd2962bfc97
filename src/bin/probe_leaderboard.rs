//! Probe: leaderboard, positions and activity endpoints
//!
//! Hits the three data-api endpoints the dashboard uses and documents:
//! - Response status and latency
//! - Response shape and fields of the first item
//! - How many items parse into our types

use std::time::Instant;

use anyhow::Result;
use polymarket_smart_money::DATA_API_BASE;
use polymarket_smart_money::api::DataApiClient;
use polymarket_smart_money::types::{ActivityRecord, LeaderboardEntry, Position, ViewFilters};
use serde::de::DeserializeOwned;
use serde_json::Value;
use url::Url;

/// ImJustKen: #1 total profit
const PROBE_WALLET: &str = "0x9d84ce0306f8551e02efef1680475fc0f1dc1344";

async fn probe<T: DeserializeOwned>(http: &reqwest::Client, title: &str, url: Url) -> Result<()> {
    println!("--- {title} ---");
    println!("GET {url}");
    let start = Instant::now();
    let resp = http.get(url).send().await?;
    let latency = start.elapsed();
    let status = resp.status();
    let body: Value = resp.json().await?;
    println!("Status: {status}");
    println!("Latency: {latency:?}");

    match body.as_array() {
        Some(arr) => {
            println!("Item count: {}", arr.len());
            if let Some(first) = arr.first() {
                println!("\nSample item (first):");
                println!("{}", serde_json::to_string_pretty(first)?);
                println!("\nFields present:");
                if let Some(obj) = first.as_object() {
                    for key in obj.keys() {
                        println!("  - {key}");
                    }
                }
            }
            let parsed = arr
                .iter()
                .filter(|v| serde_json::from_value::<T>((*v).clone()).is_ok())
                .count();
            println!("\nParsed {parsed}/{} item(s)", arr.len());
        }
        None => {
            println!("Response is not an array:");
            println!("{}", serde_json::to_string_pretty(&body)?);
        }
    }
    println!();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let wallet = std::env::args().nth(1).unwrap_or_else(|| PROBE_WALLET.to_string());
    let client = DataApiClient::new(DATA_API_BASE, None)?;
    let http = reqwest::Client::new();

    println!("=== Probe: data-api endpoints ===");
    println!("Wallet: {wallet}");
    println!();

    probe::<LeaderboardEntry>(
        &http,
        "1. Leaderboard (defaults)",
        client.leaderboard_url(&ViewFilters::default()),
    )
    .await?;
    probe::<Position>(&http, "2. Positions", client.positions_url(&wallet)).await?;
    probe::<ActivityRecord>(&http, "3. Activity", client.activity_url(&wallet)).await?;

    println!("=== Probe Complete ===");
    Ok(())
}
