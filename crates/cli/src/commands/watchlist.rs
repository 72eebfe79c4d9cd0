//! Offline edits to the stored watchlist.

use super::{binance_client, ConfigArgs};
use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use price_alert_monitor::{JsonWatchlistStore, LogAlertSink, MonitorService};
use std::sync::Arc;

#[derive(Args, Debug)]
pub struct WatchlistArgs {
    #[command(flatten)]
    pub config: ConfigArgs,

    #[command(subcommand)]
    pub action: WatchlistAction,
}

#[derive(Subcommand, Debug)]
pub enum WatchlistAction {
    /// Print the stored symbols
    List,
    /// Verify a symbol against the exchange and store it
    Add {
        /// Base asset (e.g. BTC)
        symbol: String,
    },
    /// Remove a stored symbol
    Remove {
        /// Base asset (e.g. BTC)
        symbol: String,
    },
}

pub async fn run(args: WatchlistArgs) -> Result<()> {
    let config = args.config.load()?;
    let quote = config.exchange.quote_asset.clone();
    let store = Arc::new(JsonWatchlistStore::new(config.storage.watchlist_path.clone()));
    // Refuse to edit a file we could not read; a save would overwrite it.
    let service = MonitorService::open(
        config.monitor.clone(),
        store,
        binance_client(&config)?,
        Arc::new(LogAlertSink::new(quote.clone())),
        Vec::new(),
    )
    .with_context(|| {
        format!(
            "failed to read watchlist {}",
            config.storage.watchlist_path.display()
        )
    })?;

    match args.action {
        WatchlistAction::List => {
            let symbols = service.list_symbols();
            if symbols.is_empty() {
                println!("No trading pairs are being monitored.");
            }
            for symbol in symbols {
                println!("{}", symbol.pair(&quote));
            }
        }
        WatchlistAction::Add { symbol } => {
            let outcome = match service.add_symbol(&symbol).await {
                Ok(outcome) => outcome,
                Err(e) if e.is_conflict() => {
                    println!("{e}");
                    return Ok(());
                }
                Err(e) => return Err(e).with_context(|| format!("could not add {symbol}")),
            };
            if let Some(e) = outcome.persist_error {
                return Err(e).context("failed to save watchlist");
            }
            println!(
                "Added {} (current price {})",
                outcome.symbol.pair(&quote),
                outcome.price.normalize()
            );
        }
        WatchlistAction::Remove { symbol } => {
            let outcome = match service.remove_symbol(&symbol) {
                Ok(outcome) => outcome,
                Err(e) if e.is_conflict() => {
                    println!("{e}");
                    return Ok(());
                }
                Err(e) => return Err(e).with_context(|| format!("could not remove {symbol}")),
            };
            if let Some(e) = outcome.persist_error {
                return Err(e).context("failed to save watchlist");
            }
            println!("Removed {}", outcome.symbol.pair(&quote));
        }
    }

    Ok(())
}
