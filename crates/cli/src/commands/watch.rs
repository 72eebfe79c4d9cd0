//! Headless monitoring: alerts go to the log instead of Telegram.

use super::{binance_client, ConfigArgs};
use anyhow::{bail, Context, Result};
use clap::Args;
use price_alert_core::{Symbol, WatchlistStore};
use price_alert_monitor::{
    JsonWatchlistStore, LogAlertSink, MemoryWatchlistStore, MonitorService, StartOutcome,
};
use std::sync::Arc;
use tracing::info;

#[derive(Args, Debug)]
pub struct WatchArgs {
    #[command(flatten)]
    pub config: ConfigArgs,

    /// Base assets to watch (e.g. BTC ETH); defaults to the stored watchlist
    pub symbols: Vec<String>,
}

pub async fn run(args: WatchArgs) -> Result<()> {
    let config = args.config.load()?;
    let source = binance_client(&config)?;
    let sink = Arc::new(LogAlertSink::new(config.exchange.quote_asset.clone()));

    // Symbols given on the command line are not written back to disk.
    let store: Arc<dyn WatchlistStore> = if args.symbols.is_empty() {
        Arc::new(JsonWatchlistStore::new(config.storage.watchlist_path.clone()))
    } else {
        let symbols = args
            .symbols
            .iter()
            .map(|raw| Symbol::parse(raw).with_context(|| format!("invalid symbol {raw:?}")))
            .collect::<Result<Vec<_>>>()?;
        Arc::new(MemoryWatchlistStore::new(symbols))
    };

    let service = MonitorService::new(config.monitor.clone(), store, source, sink, Vec::new());

    match service.request_start().await {
        StartOutcome::Started | StartOutcome::AlreadyRunning => {}
        StartOutcome::NothingToMonitor => {
            bail!("nothing to monitor: pass symbols or add some with `price-alert watchlist add`")
        }
    }

    let symbols = service
        .list_symbols()
        .iter()
        .map(|s| s.as_str().to_string())
        .collect::<Vec<_>>()
        .join(" ");
    let status = service.status().await;
    info!(
        symbols = %symbols,
        started_at = ?status.started_at,
        threshold_pct = config.monitor.threshold_pct,
        window = %config.monitor.window_label(),
        "watching; press Ctrl+C to stop"
    );

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for Ctrl+C")?;
    info!("Received Ctrl+C, stopping...");
    service.request_stop().await;

    Ok(())
}
