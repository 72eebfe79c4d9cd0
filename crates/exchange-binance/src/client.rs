//! Binance REST client with rate limiting.
//!
//! Only the public ticker endpoint is used, so no authentication is needed.

use crate::error::{BinanceError, Result};
use crate::types::{ApiErrorBody, TickerPrice};
use async_trait::async_trait;
use governor::{Quota, RateLimiter};
use nonzero_ext::nonzero;
use price_alert_core::{ExchangeConfig, PriceError, PriceSource, Symbol};
use reqwest::{Client, StatusCode};
use rust_decimal::Decimal;
use std::num::NonZeroU32;
use std::sync::Arc;

/// Binance spot API base URL.
pub const BINANCE_API_URL: &str = "https://api.binance.com";

const TICKER_PRICE_PATH: &str = "/api/v3/ticker/price";

/// Longest base asset accepted before a request is built.
const MAX_SYMBOL_LEN: usize = 20;

/// Configuration for the Binance client.
#[derive(Debug, Clone)]
pub struct BinanceClientConfig {
    /// Base URL for the API.
    pub base_url: String,

    /// Quote asset appended to every base symbol.
    pub quote_asset: String,

    /// Requests per minute limit.
    pub requests_per_minute: NonZeroU32,

    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for BinanceClientConfig {
    fn default() -> Self {
        Self {
            base_url: BINANCE_API_URL.to_string(),
            quote_asset: "USDT".to_string(),
            requests_per_minute: nonzero!(1200u32),
            timeout_secs: 10,
        }
    }
}

impl From<&ExchangeConfig> for BinanceClientConfig {
    fn from(config: &ExchangeConfig) -> Self {
        let defaults = Self::default();
        Self {
            base_url: config.api_url.clone(),
            quote_asset: config.quote_asset.clone(),
            requests_per_minute: NonZeroU32::new(config.requests_per_minute)
                .unwrap_or(defaults.requests_per_minute),
            timeout_secs: config.timeout_secs,
        }
    }
}

impl BinanceClientConfig {
    /// Sets the base URL.
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Sets the quote asset.
    #[must_use]
    pub fn with_quote_asset(mut self, quote: impl Into<String>) -> Self {
        self.quote_asset = quote.into();
        self
    }

    /// Sets the rate limit.
    #[must_use]
    pub fn with_rate_limit(mut self, requests_per_minute: NonZeroU32) -> Self {
        self.requests_per_minute = requests_per_minute;
        self
    }

    /// Sets the request timeout.
    #[must_use]
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// Binance REST API client.
pub struct BinanceClient {
    config: BinanceClientConfig,
    http: Client,
    rate_limiter: Arc<
        RateLimiter<
            governor::state::NotKeyed,
            governor::state::InMemoryState,
            governor::clock::DefaultClock,
        >,
    >,
}

impl std::fmt::Debug for BinanceClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BinanceClient")
            .field("base_url", &self.config.base_url)
            .field("quote_asset", &self.config.quote_asset)
            .field("requests_per_minute", &self.config.requests_per_minute)
            .finish_non_exhaustive()
    }
}

impl BinanceClient {
    /// Creates a new client with the given configuration.
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be built.
    pub fn new(config: BinanceClientConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| BinanceError::Configuration(format!("failed to build HTTP client: {e}")))?;

        let quota = Quota::per_minute(config.requests_per_minute);
        let rate_limiter = Arc::new(RateLimiter::direct(quota));

        Ok(Self {
            config,
            http,
            rate_limiter,
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    #[must_use]
    pub fn quote_asset(&self) -> &str {
        &self.config.quote_asset
    }

    /// Builds the exchange pair for a base asset, e.g. `BTC` -> `BTCUSDT`.
    ///
    /// # Errors
    /// Returns [`BinanceError::InvalidSymbol`] for empty, overlong, or
    /// non-alphanumeric input.
    pub fn pair_symbol(&self, base: &str) -> Result<String> {
        if base.is_empty() {
            return Err(BinanceError::InvalidSymbol("symbol cannot be empty".to_string()));
        }
        if base.len() > MAX_SYMBOL_LEN {
            return Err(BinanceError::InvalidSymbol(format!(
                "exceeds maximum length of {MAX_SYMBOL_LEN}: {base}"
            )));
        }
        if !base.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(BinanceError::InvalidSymbol(format!(
                "must contain only letters and digits: {base}"
            )));
        }
        Ok(format!(
            "{}{}",
            base.to_ascii_uppercase(),
            self.config.quote_asset.to_ascii_uppercase()
        ))
    }

    /// Gets the last traded price of `base` against the quote asset.
    ///
    /// # Errors
    /// Returns error if the symbol is invalid or the API call fails.
    pub async fn ticker_price(&self, base: &str) -> Result<TickerPrice> {
        let pair = self.pair_symbol(base)?;
        self.get(TICKER_PRICE_PATH, &[("symbol", pair.as_str())])
            .await
    }

    /// Waits for the rate limiter and makes a GET request.
    async fn get<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T> {
        self.rate_limiter.until_ready().await;

        let url = format!("{}{}", self.config.base_url, path);
        tracing::debug!(url = %url, ?query, "GET");

        let response = self
            .http
            .get(&url)
            .header("Accept", "application/json")
            .query(query)
            .send()
            .await?;

        self.handle_response(response).await
    }

    async fn handle_response<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T> {
        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS || status == StatusCode::IM_A_TEAPOT {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse().ok())
                .unwrap_or(60);
            return Err(BinanceError::rate_limit(retry_after));
        }

        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorBody>(&text)
                .map(|body| format!("{} (code {})", body.msg, body.code))
                .unwrap_or(text);
            return Err(BinanceError::api(status.as_u16(), message));
        }

        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

#[async_trait]
impl PriceSource for BinanceClient {
    async fn fetch_price(&self, symbol: &Symbol) -> std::result::Result<Decimal, PriceError> {
        let ticker = self
            .ticker_price(symbol.as_str())
            .await
            .map_err(|e| PriceError::lookup(symbol, e.to_string()))?;

        if ticker.price <= Decimal::ZERO {
            return Err(PriceError::invalid_price(symbol, ticker.price));
        }
        Ok(ticker.price)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> BinanceClient {
        BinanceClient::new(BinanceClientConfig::default().with_base_url(server.uri())).unwrap()
    }

    fn sym(s: &str) -> Symbol {
        Symbol::parse(s).unwrap()
    }

    // ==================== Config Tests ====================

    #[test]
    fn test_client_config_default() {
        let config = BinanceClientConfig::default();
        assert_eq!(config.base_url, BINANCE_API_URL);
        assert_eq!(config.quote_asset, "USDT");
        assert_eq!(config.requests_per_minute.get(), 1200);
        assert_eq!(config.timeout_secs, 10);
    }

    #[test]
    fn test_client_config_builder() {
        let config = BinanceClientConfig::default()
            .with_base_url("https://custom.url")
            .with_quote_asset("FDUSD")
            .with_rate_limit(nonzero!(60u32))
            .with_timeout_secs(3);

        assert_eq!(config.base_url, "https://custom.url");
        assert_eq!(config.quote_asset, "FDUSD");
        assert_eq!(config.requests_per_minute.get(), 60);
        assert_eq!(config.timeout_secs, 3);
    }

    #[test]
    fn test_config_from_exchange_section() {
        let section = ExchangeConfig {
            requests_per_minute: 0,
            ..Default::default()
        };
        let config = BinanceClientConfig::from(&section);
        assert_eq!(config.requests_per_minute.get(), 1200);
        assert_eq!(config.base_url, "https://api.binance.com");
    }

    // ==================== Symbol Validation ====================

    #[test]
    fn test_pair_symbol() {
        let client = BinanceClient::new(BinanceClientConfig::default()).unwrap();
        assert_eq!(client.pair_symbol("btc").unwrap(), "BTCUSDT");
        assert!(client.pair_symbol("").is_err());
        assert!(client.pair_symbol("../etc").is_err());
        assert!(client.pair_symbol(&"X".repeat(21)).is_err());
    }

    // ==================== HTTP Tests ====================

    #[tokio::test]
    async fn test_fetch_price_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v3/ticker/price"))
            .and(query_param("symbol", "BTCUSDT"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "symbol": "BTCUSDT",
                "price": "65000.12000000"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let price = client_for(&server).fetch_price(&sym("BTC")).await.unwrap();
        assert_eq!(price, dec!(65000.12));
    }

    #[tokio::test]
    async fn test_unknown_symbol_is_lookup_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v3/ticker/price"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "code": -1121,
                "msg": "Invalid symbol."
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let raw = client.ticker_price("XYZ").await.unwrap_err();
        match &raw {
            BinanceError::Api {
                status_code,
                message,
            } => {
                assert_eq!(*status_code, 400);
                assert!(message.contains("Invalid symbol."));
            }
            other => panic!("unexpected error: {other:?}"),
        }

        let err = client.fetch_price(&sym("XYZ")).await.unwrap_err();
        assert!(matches!(err, PriceError::Lookup { .. }));
    }

    #[tokio::test]
    async fn test_rate_limited() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v3/ticker/price"))
            .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "7"))
            .mount(&server)
            .await;

        let err = client_for(&server).ticker_price("BTC").await.unwrap_err();
        assert!(matches!(err, BinanceError::RateLimit { retry_after_secs: 7 }));
    }

    #[tokio::test]
    async fn test_zero_price_is_invalid() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v3/ticker/price"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "symbol": "DEADUSDT",
                "price": "0.00000000"
            })))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .fetch_price(&sym("DEAD"))
            .await
            .unwrap_err();
        assert!(matches!(err, PriceError::InvalidPrice { .. }));
    }

    #[tokio::test]
    async fn test_malformed_body_is_parse_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v3/ticker/price"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
            .mount(&server)
            .await;

        let err = client_for(&server).ticker_price("BTC").await.unwrap_err();
        assert!(matches!(err, BinanceError::Parse(_)));
    }

    #[tokio::test]
    async fn test_unreachable_host_is_network_error() {
        let client = BinanceClient::new(
            BinanceClientConfig::default()
                .with_base_url("http://127.0.0.1:1")
                .with_timeout_secs(2),
        )
        .unwrap();

        let err = client.ticker_price("BTC").await.unwrap_err();
        assert!(matches!(
            err,
            BinanceError::Network(_) | BinanceError::Timeout(_)
        ));
    }
}
