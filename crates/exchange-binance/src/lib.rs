//! Binance spot market integration.
//!
//! Provides a rate-limited REST client for the public ticker endpoint and
//! exposes it as a [`PriceSource`](price_alert_core::PriceSource).
//!
//! # Example
//!
//! ```ignore
//! use price_alert_binance::{BinanceClient, BinanceClientConfig};
//! use price_alert_core::{PriceSource, Symbol};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = BinanceClient::new(BinanceClientConfig::default())?;
//!     let price = client.fetch_price(&Symbol::parse("BTC")?).await?;
//!     println!("BTC/USDT: {price}");
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod error;
pub mod types;

pub use client::{BinanceClient, BinanceClientConfig, BINANCE_API_URL};
pub use error::{BinanceError, Result};
pub use types::TickerPrice;
