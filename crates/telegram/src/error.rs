//! Error types for the Telegram integration.

use thiserror::Error;

/// Errors that can occur when calling the Bot API.
#[derive(Debug, Error)]
pub enum TelegramError {
    /// The API answered `ok: false` or a non-success status.
    #[error("API error: {error_code} - {description}")]
    Api {
        /// Telegram error code (mirrors the HTTP status).
        error_code: i64,
        /// Human-readable description from the API.
        description: String,
    },

    /// Flood control triggered.
    #[error("rate limit exceeded, retry after {retry_after_secs}s")]
    RateLimit {
        /// Seconds to wait before retry.
        retry_after_secs: u64,
    },

    /// Network error.
    #[error("network error: {0}")]
    Network(String),

    /// Request timeout.
    #[error("request timeout: {0}")]
    Timeout(String),

    /// Response body could not be decoded.
    #[error("parse error: {0}")]
    Parse(String),

    /// Client could not be constructed.
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl TelegramError {
    /// Creates an API error.
    pub fn api(error_code: i64, description: impl Into<String>) -> Self {
        Self::Api {
            error_code,
            description: description.into(),
        }
    }

    /// Creates a rate limit error.
    #[must_use]
    pub const fn rate_limit(retry_after_secs: u64) -> Self {
        Self::RateLimit { retry_after_secs }
    }

    /// Returns true if a later request may succeed.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        match self {
            Self::Network(_) | Self::Timeout(_) | Self::RateLimit { .. } => true,
            Self::Api { error_code, .. } => *error_code >= 500,
            _ => false,
        }
    }

    /// Returns the suggested retry delay in seconds, if applicable.
    #[must_use]
    pub const fn retry_delay_secs(&self) -> Option<u64> {
        match self {
            Self::RateLimit { retry_after_secs } => Some(*retry_after_secs),
            Self::Network(_) | Self::Timeout(_) => Some(1),
            Self::Api { error_code, .. } if *error_code >= 500 => Some(2),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for TelegramError {
    fn from(err: reqwest::Error) -> Self {
        // reqwest errors embed the URL, which carries the bot token.
        let err = err.without_url();
        if err.is_timeout() {
            Self::Timeout(err.to_string())
        } else if err.is_decode() {
            Self::Parse(err.to_string())
        } else if err.is_connect() {
            Self::Network(format!("connection failed: {err}"))
        } else {
            Self::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for TelegramError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err.to_string())
    }
}

/// Result type for Telegram operations.
pub type Result<T> = std::result::Result<T, TelegramError>;
