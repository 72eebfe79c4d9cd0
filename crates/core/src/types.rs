use crate::error::SymbolError;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Chat/user identifier an alert is delivered to.
pub type RecipientId = i64;

/// Uppercase ticker identifier such as `BTC`.
///
/// Carries no quote-currency suffix; the quote asset is paired with the
/// symbol only when a price is looked up or displayed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Symbol(String);

impl Symbol {
    /// Longest accepted ticker.
    pub const MAX_LEN: usize = 20;

    /// Normalizes and validates a raw ticker.
    ///
    /// Surrounding whitespace is trimmed and the ticker is upper-cased.
    ///
    /// # Errors
    /// Returns [`SymbolError`] if the ticker is empty, too long, or contains
    /// anything other than ASCII letters and digits.
    pub fn parse(raw: &str) -> Result<Self, SymbolError> {
        let normalized = raw.trim().to_ascii_uppercase();

        if normalized.is_empty() {
            return Err(SymbolError::new(raw, "symbol cannot be empty"));
        }
        if normalized.len() > Self::MAX_LEN {
            return Err(SymbolError::new(raw, "symbol is too long"));
        }
        if !normalized.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(SymbolError::new(
                raw,
                "symbol must contain only letters and digits",
            ));
        }

        Ok(Self(normalized))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Display form of the trading pair, e.g. `BTC/USDT`.
    #[must_use]
    pub fn pair(&self, quote_asset: &str) -> String {
        format!("{}/{}", self.0, quote_asset)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Symbol {
    type Err = SymbolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Symbol {
    type Error = SymbolError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Symbol> for String {
    fn from(symbol: Symbol) -> Self {
        symbol.0
    }
}

impl AsRef<str> for Symbol {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A single observed price at a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceSample {
    pub timestamp: DateTime<Utc>,
    pub price: Decimal,
}

impl PriceSample {
    #[must_use]
    pub const fn new(timestamp: DateTime<Utc>, price: Decimal) -> Self {
        Self { timestamp, price }
    }
}

/// Raised when a symbol's price rose by at least the threshold inside the window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertEvent {
    pub symbol: Symbol,
    /// Increase over the window baseline, in percent (`2.0` means 2 %).
    pub percent_increase: f64,
    /// The price that produced the detection.
    pub current_price: Decimal,
    pub detected_at: DateTime<Utc>,
}
