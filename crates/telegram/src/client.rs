//! Telegram Bot API client.

use crate::error::{Result, TelegramError};
use crate::types::{ApiResponse, GetUpdatesRequest, Message, SendMessageRequest, Update, User};
use price_alert_core::TelegramConfig;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

/// Telegram Bot API base URL.
pub const TELEGRAM_API_URL: &str = "https://api.telegram.org";

/// Headroom on top of the long-poll timeout before the HTTP request gives up.
const REQUEST_TIMEOUT_MARGIN_SECS: u64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseMode {
    Markdown,
}

impl ParseMode {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Markdown => "Markdown",
        }
    }
}

/// Configuration for the Telegram client.
#[derive(Clone)]
pub struct TelegramClientConfig {
    pub base_url: String,
    pub token: String,
    /// Long-poll timeout passed to `getUpdates`.
    pub poll_timeout_secs: u64,
}

impl std::fmt::Debug for TelegramClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramClientConfig")
            .field("base_url", &self.base_url)
            .field("poll_timeout_secs", &self.poll_timeout_secs)
            .finish_non_exhaustive()
    }
}

impl TelegramClientConfig {
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            base_url: TELEGRAM_API_URL.to_string(),
            token: token.into(),
            poll_timeout_secs: 30,
        }
    }

    /// Builds a client configuration from the `telegram` section.
    ///
    /// # Errors
    /// Returns [`TelegramError::Configuration`] if no token is set.
    pub fn from_config(config: &TelegramConfig) -> Result<Self> {
        let token = config
            .token
            .clone()
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| {
                TelegramError::Configuration(
                    "bot token missing (set TELEGRAM_TOKEN or telegram.token)".to_string(),
                )
            })?;
        Ok(Self {
            base_url: config.api_url.clone(),
            token,
            poll_timeout_secs: config.poll_timeout_secs,
        })
    }

    /// Sets the base URL.
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Sets the long-poll timeout.
    #[must_use]
    pub fn with_poll_timeout_secs(mut self, secs: u64) -> Self {
        self.poll_timeout_secs = secs;
        self
    }
}

/// Bot API client.
pub struct TelegramClient {
    config: TelegramClientConfig,
    http: Client,
}

impl std::fmt::Debug for TelegramClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramClient")
            .field("base_url", &self.config.base_url)
            .finish_non_exhaustive()
    }
}

impl TelegramClient {
    /// Creates a new client.
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be built.
    pub fn new(config: TelegramClientConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(
                config.poll_timeout_secs + REQUEST_TIMEOUT_MARGIN_SECS,
            ))
            .build()
            .map_err(|e| TelegramError::Configuration(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { config, http })
    }

    /// Returns the bot's own account.
    ///
    /// # Errors
    /// Returns error if the API call fails.
    pub async fn get_me(&self) -> Result<User> {
        self.call("getMe", &serde_json::json!({})).await
    }

    /// Long-polls for new updates starting at `offset`.
    ///
    /// # Errors
    /// Returns error if the API call fails.
    pub async fn get_updates(&self, offset: Option<i64>) -> Result<Vec<Update>> {
        let request = GetUpdatesRequest {
            offset,
            timeout: self.config.poll_timeout_secs,
            allowed_updates: ["message"],
        };
        self.call("getUpdates", &request).await
    }

    /// Sends a text message to a chat.
    ///
    /// # Errors
    /// Returns error if the API call fails.
    pub async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        parse_mode: Option<ParseMode>,
    ) -> Result<Message> {
        let request = SendMessageRequest {
            chat_id,
            text,
            parse_mode: parse_mode.map(ParseMode::as_str),
        };
        self.call("sendMessage", &request).await
    }

    async fn call<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        method: &str,
        body: &B,
    ) -> Result<T> {
        let url = format!("{}/bot{}/{}", self.config.base_url, self.config.token, method);
        tracing::debug!(method, "POST Bot API");

        let response = self.http.post(&url).json(body).send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;

        let envelope: ApiResponse<T> = serde_json::from_slice(&bytes).map_err(|e| {
            if status.is_success() {
                TelegramError::Parse(e.to_string())
            } else {
                TelegramError::api(i64::from(status.as_u16()), String::from_utf8_lossy(&bytes))
            }
        })?;

        if !envelope.ok {
            let error_code = envelope
                .error_code
                .unwrap_or_else(|| i64::from(status.as_u16()));
            if error_code == 429 {
                let retry_after = envelope
                    .parameters
                    .and_then(|p| p.retry_after)
                    .unwrap_or(5);
                return Err(TelegramError::rate_limit(retry_after));
            }
            return Err(TelegramError::api(
                error_code,
                envelope.description.unwrap_or_default(),
            ));
        }

        envelope
            .result
            .ok_or_else(|| TelegramError::Parse(format!("{method}: ok response without result")))
    }
}
