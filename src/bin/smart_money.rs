use std::io::BufRead;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{info, warn};

use polymarket_smart_money::api::DataApiClient;
use polymarket_smart_money::command::Command;
use polymarket_smart_money::config::{AppConfig, CONFIG_PATH};
use polymarket_smart_money::dashboard::{Dashboard, DashboardOptions, Event};
use polymarket_smart_money::reporter;
use polymarket_smart_money::types::{Category, OrderBy, TimePeriod};

#[derive(Parser)]
#[command(
    name = "smart-money",
    about = "Polymarket leaderboard and smart-money monitor",
    after_help = "Reads commands from stdin (select, shortcut, search, filter, refresh, auto, copy, quit) \
                  and writes UI updates to stdout as JSON lines."
)]
struct Args {
    /// Path to the TOML config file (defaults are used if it does not exist)
    #[arg(long, default_value = CONFIG_PATH)]
    config: PathBuf,

    /// Initial leaderboard category (OVERALL, POLITICS, SPORTS, ...)
    #[arg(long)]
    category: Option<Category>,

    /// Initial leaderboard time period (DAY, WEEK, MONTH, ALL)
    #[arg(long)]
    time_period: Option<TimePeriod>,

    /// Initial leaderboard ordering (PNL, VOL)
    #[arg(long)]
    order_by: Option<OrderBy>,

    /// Start with periodic refresh turned off
    #[arg(long)]
    no_auto_refresh: bool,

    /// Wallet address to select on startup
    #[arg(long)]
    select: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config = AppConfig::load_or_default(&args.config)?;
    let client = DataApiClient::new(&config.api.data_api_base, config.api.request_timeout())?;

    let mut options = DashboardOptions::from_config(&config);
    if let Some(category) = args.category {
        options.filters.category = category;
    }
    if let Some(period) = args.time_period {
        options.filters.time_period = period;
    }
    if let Some(order) = args.order_by {
        options.filters.order_by = order;
    }
    if args.no_auto_refresh {
        options.auto_refresh = false;
    }

    info!(
        "Starting smart-money monitor — api={} refresh={}s auto={}",
        config.api.data_api_base,
        options.refresh_interval.as_secs(),
        options.auto_refresh,
    );
    for sm in &options.shortcuts {
        info!("Shortcut: {} {} ({})", sm.name, sm.address, sm.tag);
    }

    let (mut dashboard, rx) = Dashboard::new(Arc::new(client), options);
    let tx = dashboard.sender();
    dashboard.start();

    if let Some(wallet) = args.select {
        tx.send(Event::Command(Command::Select { wallet, name: None }))?;
    }

    // A plain thread: a pending stdin read must not hold up runtime shutdown.
    let input = tx.clone();
    std::thread::spawn(move || forward_commands(std::io::stdin().lock(), &input));
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Shutdown signal received");
            tx.send(Event::Command(Command::Quit)).ok();
        }
    });

    info!("Ready. Type commands on stdin; Ctrl+C to stop.");
    dashboard
        .run(rx, |update| reporter::report_update(&update))
        .await;

    Ok(())
}

/// Forward input lines to the dashboard as commands.
///
/// End of input stops reading but leaves the dashboard polling.
fn forward_commands(input: impl BufRead, tx: &UnboundedSender<Event>) {
    for line in input.lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                warn!("Failed to read input: {e}");
                return;
            }
        };
        if line.trim().is_empty() {
            continue;
        }
        match line.parse::<Command>() {
            Ok(cmd) => {
                if tx.send(Event::Command(cmd)).is_err() {
                    return;
                }
            }
            Err(e) => warn!("Ignoring {line:?}: {e}"),
        }
    }
    info!("Input closed, still refreshing until Ctrl+C");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use tokio::sync::mpsc;

    #[test]
    fn forwards_parsed_lines_until_end_of_input() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let input = Cursor::new("refresh\n\n  \nbogus words\nauto off\nquit\n");
        forward_commands(input, &tx);

        let mut got = Vec::new();
        while let Ok(Event::Command(cmd)) = rx.try_recv() {
            got.push(cmd);
        }
        assert_eq!(
            got,
            [Command::Refresh, Command::AutoRefresh(false), Command::Quit]
        );
    }

    #[test]
    fn stops_once_dashboard_is_gone() {
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);
        forward_commands(Cursor::new("refresh\nquit\n"), &tx);
    }
}
