use crate::history::SlidingWindowHistory;
use price_alert_core::{PriceError, Symbol};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

/// Result of evaluating a symbol's window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Detection {
    pub triggered: bool,
    /// Change against the oldest retained sample, in percent.
    pub percent_increase: f64,
}

impl Detection {
    /// Not enough history to compare against.
    pub const COLD: Self = Self {
        triggered: false,
        percent_increase: 0.0,
    };
}

/// Compares a fresh price against the oldest sample in the window.
#[derive(Debug, Clone, Copy)]
pub struct IncreaseDetector {
    threshold_pct: f64,
}

impl IncreaseDetector {
    #[must_use]
    pub const fn new(threshold_pct: f64) -> Self {
        Self { threshold_pct }
    }

    /// Evaluates `current_price` against the oldest sample `history` holds
    /// for `symbol`.
    ///
    /// Fewer than two samples is a cold start and never triggers. The
    /// threshold is inclusive.
    ///
    /// # Errors
    /// Returns [`PriceError::InvalidPrice`] when the baseline or the current
    /// price is not positive.
    pub fn evaluate(
        &self,
        symbol: &Symbol,
        current_price: Decimal,
        history: &SlidingWindowHistory,
    ) -> Result<Detection, PriceError> {
        if history.len(symbol) < 2 {
            return Ok(Detection::COLD);
        }
        let Some(oldest) = history.oldest(symbol) else {
            return Ok(Detection::COLD);
        };

        if oldest.price <= Decimal::ZERO {
            return Err(PriceError::invalid_price(symbol, oldest.price));
        }
        if current_price <= Decimal::ZERO {
            return Err(PriceError::invalid_price(symbol, current_price));
        }

        let change = (current_price - oldest.price) / oldest.price * Decimal::ONE_HUNDRED;
        let percent_increase = change.to_f64().unwrap_or(0.0);

        Ok(Detection {
            triggered: percent_increase >= self.threshold_pct,
            percent_increase,
        })
    }
}

impl Default for IncreaseDetector {
    fn default() -> Self {
        Self::new(2.0)
    }
}
