use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Response of `GET /api/v3/ticker/price`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickerPrice {
    /// Exchange pair symbol, e.g. `BTCUSDT`.
    pub symbol: String,
    /// Last traded price; Binance sends it as a string.
    pub price: Decimal,
}

/// Error body Binance returns alongside 4xx statuses.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiErrorBody {
    pub code: i64,
    pub msg: String,
}
