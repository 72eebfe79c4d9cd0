//! Runs the Telegram bot with the price monitor behind it.

use super::{binance_client, ConfigArgs};
use anyhow::{Context, Result};
use clap::Args;
use price_alert_monitor::{JsonWatchlistStore, MonitorService};
use price_alert_telegram::{
    Authorizer, CommandHandler, MessageFormatter, TelegramAlertSink, TelegramBot,
    TelegramClient, TelegramClientConfig,
};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{info, warn};

#[derive(Args, Debug)]
pub struct RunArgs {
    #[command(flatten)]
    pub config: ConfigArgs,
}

pub async fn run(args: RunArgs) -> Result<()> {
    let config = args.config.load()?;

    let telegram = TelegramClientConfig::from_config(&config.telegram)?;
    let client = Arc::new(TelegramClient::new(telegram).context("failed to build Telegram client")?);
    let source = binance_client(&config)?;

    let recipients = config.telegram.authorized_user_ids.clone();
    let auth = Authorizer::new(recipients.iter().copied());
    if auth.is_empty() {
        warn!("no authorized user ids configured; every command except /help will be rejected");
    }

    let formatter = MessageFormatter::new(&config.monitor, config.exchange.quote_asset.clone());
    let sink = Arc::new(TelegramAlertSink::new(Arc::clone(&client), formatter.clone()));
    let store = Arc::new(JsonWatchlistStore::new(config.storage.watchlist_path.clone()));
    let store_path = store.path().display().to_string();

    let service = Arc::new(MonitorService::new(
        config.monitor.clone(),
        store,
        source,
        sink,
        recipients,
    ));
    info!(
        watched = service.list_symbols().len(),
        path = %store_path,
        "watchlist loaded"
    );

    let handler = Arc::new(CommandHandler::new(
        Arc::clone(&service),
        auth,
        formatter,
    ));

    let mut bot = TelegramBot::new(Arc::clone(&client), handler);
    match client.get_me().await {
        Ok(me) => {
            if let Some(username) = me.username {
                info!(bot = %username, "connected to Telegram");
                bot = bot.with_bot_username(username);
            }
        }
        Err(e) => warn!(error = %e, "getMe failed; @mentions will not be filtered"),
    }

    let (stop_tx, stop_rx) = watch::channel(false);
    let bot_task = tokio::spawn(bot.run(stop_rx));

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for Ctrl+C")?;
    info!("Received Ctrl+C, stopping...");

    let _ = stop_tx.send(true);
    service.request_stop().await;
    bot_task.await.context("bot task failed")?;

    info!("price alert bot stopped");
    Ok(())
}
