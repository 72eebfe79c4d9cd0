use crate::types::RecipientId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub monitor: MonitorConfig,
    #[serde(default)]
    pub exchange: ExchangeConfig,
    #[serde(default)]
    pub telegram: TelegramConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Alert rule and polling cadence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Trailing window the increase is measured over.
    #[serde(default = "default_window_secs")]
    pub window_secs: u64,
    /// Minimum increase in percent that raises an alert (inclusive).
    #[serde(default = "default_threshold_pct")]
    pub threshold_pct: f64,
    /// Pause between poll cycles.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

const fn default_window_secs() -> u64 {
    300 // 5 minutes
}

const fn default_threshold_pct() -> f64 {
    2.0
}

const fn default_poll_interval_ms() -> u64 {
    5_000
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            window_secs: default_window_secs(),
            threshold_pct: default_threshold_pct(),
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

impl MonitorConfig {
    #[must_use]
    pub fn window(&self) -> chrono::Duration {
        chrono::Duration::seconds(i64::try_from(self.window_secs).unwrap_or(i64::MAX))
    }

    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Window rendered for humans, e.g. "5 minutes" or "90 seconds".
    #[must_use]
    pub fn window_label(&self) -> String {
        match self.window_secs {
            60 => "1 minute".to_string(),
            s if s % 60 == 0 => format!("{} minutes", s / 60),
            s => format!("{s} seconds"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExchangeConfig {
    pub api_url: String,
    /// Quote asset every symbol is priced against.
    pub quote_asset: String,
    pub requests_per_minute: u32,
    pub timeout_secs: u64,
}

impl Default for ExchangeConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.binance.com".to_string(),
            quote_asset: "USDT".to_string(),
            requests_per_minute: 1200,
            timeout_secs: 10,
        }
    }
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelegramConfig {
    pub api_url: String,
    /// Bot token; required only when the chat front-end runs.
    pub token: Option<String>,
    /// Users allowed to issue commands. Alerts go to the same list.
    pub authorized_user_ids: Vec<RecipientId>,
    /// Long-poll timeout for `getUpdates`.
    pub poll_timeout_secs: u64,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.telegram.org".to_string(),
            token: None,
            authorized_user_ids: Vec::new(),
            poll_timeout_secs: 30,
        }
    }
}

impl fmt::Debug for TelegramConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TelegramConfig")
            .field("api_url", &self.api_url)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("authorized_user_ids", &self.authorized_user_ids)
            .field("poll_timeout_secs", &self.poll_timeout_secs)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub watchlist_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            watchlist_path: PathBuf::from("trading_pairs.json"),
        }
    }
}
