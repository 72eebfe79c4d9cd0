use crate::error::{PriceError, SinkError, StoreError};
use crate::types::{AlertEvent, RecipientId, Symbol};
use async_trait::async_trait;
use rust_decimal::Decimal;

/// Quotes the current (last trade) price of a symbol.
#[async_trait]
pub trait PriceSource: Send + Sync {
    async fn fetch_price(&self, symbol: &Symbol) -> Result<Decimal, PriceError>;
}

/// Delivers alerts to their recipients.
///
/// Implementations report failures but the monitor never lets them escape
/// a poll cycle.
#[async_trait]
pub trait AlertSink: Send + Sync {
    async fn deliver(&self, alert: &AlertEvent, recipients: &[RecipientId])
        -> Result<(), SinkError>;
}

/// Durable list of watched symbols.
pub trait WatchlistStore: Send + Sync {
    fn load(&self) -> Result<Vec<Symbol>, StoreError>;
    fn save(&self, symbols: &[Symbol]) -> Result<(), StoreError>;
}
