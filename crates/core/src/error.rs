//! Error types shared across the monitor's boundaries.
//!
//! Each boundary trait gets its own error so callers can tell a failed
//! lookup from a bad price or an unavailable store.

use crate::types::Symbol;
use rust_decimal::Decimal;
use thiserror::Error;

/// A ticker that failed validation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("invalid symbol {raw:?}: {reason}")]
pub struct SymbolError {
    /// The input as received.
    pub raw: String,
    /// Why it was rejected.
    pub reason: &'static str,
}

impl SymbolError {
    pub fn new(raw: impl Into<String>, reason: &'static str) -> Self {
        Self {
            raw: raw.into(),
            reason,
        }
    }
}

/// Errors produced while obtaining or using a price.
#[derive(Debug, Clone, Error)]
pub enum PriceError {
    /// The price source could not quote the symbol (unreachable, unknown pair, ...).
    #[error("price lookup failed for {symbol}: {reason}")]
    Lookup {
        /// Symbol that was looked up.
        symbol: Symbol,
        /// Human-readable cause.
        reason: String,
    },

    /// A non-positive price reached a computation that divides by it.
    #[error("invalid price for {symbol}: {price}")]
    InvalidPrice {
        /// Symbol the price belongs to.
        symbol: Symbol,
        /// The offending price.
        price: Decimal,
    },
}

impl PriceError {
    /// Creates a lookup failure.
    pub fn lookup(symbol: &Symbol, reason: impl Into<String>) -> Self {
        Self::Lookup {
            symbol: symbol.clone(),
            reason: reason.into(),
        }
    }

    /// Creates an invalid price error.
    #[must_use]
    pub fn invalid_price(symbol: &Symbol, price: Decimal) -> Self {
        Self::InvalidPrice {
            symbol: symbol.clone(),
            price,
        }
    }

    /// Returns true for failures that a later poll cycle may not repeat.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Lookup { .. })
    }
}

/// Errors from the durable watchlist store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// IO error reading/writing the backing file.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored data could not be decoded or encoded.
    #[error("corrupt watchlist data: {0}")]
    Corrupt(String),
}

/// Errors from delivering an alert.
#[derive(Debug, Error)]
pub enum SinkError {
    /// Some recipients did not receive the alert.
    #[error("alert delivery failed for {failed} of {total} recipients: {message}")]
    Delivery {
        /// Number of recipients that failed.
        failed: usize,
        /// Number of recipients attempted.
        total: usize,
        /// Last failure message.
        message: String,
    },

    /// The sink's transport is unusable.
    #[error("alert transport error: {0}")]
    Transport(String),
}

impl SinkError {
    /// Creates a partial-delivery error.
    pub fn delivery(failed: usize, total: usize, message: impl Into<String>) -> Self {
        Self::Delivery {
            failed,
            total,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn lookup_error_is_transient() {
        let symbol = Symbol::parse("BTC").unwrap();
        let err = PriceError::lookup(&symbol, "timeout");
        assert!(err.is_transient());
        assert_eq!(err.to_string(), "price lookup failed for BTC: timeout");
    }

    #[test]
    fn invalid_price_is_not_transient() {
        let symbol = Symbol::parse("BTC").unwrap();
        let err = PriceError::invalid_price(&symbol, dec!(0));
        assert!(!err.is_transient());
        assert!(err.to_string().contains("invalid price"));
    }

    #[test]
    fn sink_delivery_message() {
        let err = SinkError::delivery(1, 3, "chat not found");
        assert_eq!(
            err.to_string(),
            "alert delivery failed for 1 of 3 recipients: chat not found"
        );
    }
}
