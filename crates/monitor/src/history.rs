//! Per-symbol price history trimmed to a trailing time window.

use chrono::{DateTime, Duration, Utc};
use price_alert_core::{PriceSample, Symbol};
use rust_decimal::Decimal;
use std::collections::{HashMap, VecDeque};

/// Samples per symbol, oldest first.
///
/// Growth is bounded only by trimming: every call to [`record`](Self::record)
/// trims the symbol it touched, so after a record every retained sample is
/// younger than the window.
#[derive(Debug)]
pub struct SlidingWindowHistory {
    window: Duration,
    samples: HashMap<Symbol, VecDeque<PriceSample>>,
}

impl SlidingWindowHistory {
    #[must_use]
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            samples: HashMap::new(),
        }
    }

    /// Appends `price` at `now` and trims the symbol.
    pub fn record(&mut self, symbol: &Symbol, price: Decimal, now: DateTime<Utc>) {
        self.samples
            .entry(symbol.clone())
            .or_default()
            .push_back(PriceSample::new(now, price));
        self.trim(symbol, now);
    }

    /// Drops every sample with `timestamp <= now - window`.
    pub fn trim(&mut self, symbol: &Symbol, now: DateTime<Utc>) {
        let cutoff = now - self.window;
        if let Some(samples) = self.samples.get_mut(symbol) {
            while samples.front().is_some_and(|s| s.timestamp <= cutoff) {
                samples.pop_front();
            }
        }
    }

    /// Earliest retained sample.
    #[must_use]
    pub fn oldest(&self, symbol: &Symbol) -> Option<&PriceSample> {
        self.samples.get(symbol).and_then(VecDeque::front)
    }

    #[must_use]
    pub fn len(&self, symbol: &Symbol) -> usize {
        self.samples.get(symbol).map_or(0, VecDeque::len)
    }

    /// Forgets every symbol not in `watched`.
    pub fn retain_symbols(&mut self, watched: &[Symbol]) {
        self.samples.retain(|symbol, _| watched.contains(symbol));
    }
}
