//! CLI commands for the price alert monitor.

pub mod price;
pub mod run;
pub mod watch;
pub mod watchlist;

pub use price::PriceArgs;
pub use run::RunArgs;
pub use watch::WatchArgs;
pub use watchlist::WatchlistArgs;

use anyhow::{Context, Result};
use clap::Args;
use price_alert_binance::BinanceClient;
use price_alert_core::{AppConfig, ConfigLoader};
use std::path::PathBuf;
use std::sync::Arc;

/// Config selection shared by every subcommand.
#[derive(Args, Debug, Clone)]
pub struct ConfigArgs {
    /// Config file path
    #[arg(short, long, default_value = "config/Config.toml")]
    pub config: PathBuf,

    /// Profile overlay (loads `Config.<profile>.toml` next to the base file)
    #[arg(long, env = "APP_PROFILE")]
    pub profile: Option<String>,
}

impl ConfigArgs {
    pub fn load(&self) -> Result<AppConfig> {
        let loaded = match &self.profile {
            Some(profile) => ConfigLoader::load_with_profile(&self.config, profile),
            None => ConfigLoader::load_from(&self.config),
        };
        loaded.with_context(|| format!("failed to load config from {}", self.config.display()))
    }
}

pub(crate) fn binance_client(config: &AppConfig) -> Result<Arc<BinanceClient>> {
    let client = BinanceClient::new((&config.exchange).into())
        .context("failed to build Binance client")?;
    Ok(Arc::new(client))
}
