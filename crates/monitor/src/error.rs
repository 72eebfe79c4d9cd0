use price_alert_core::{PriceError, Symbol, SymbolError};
use thiserror::Error;

/// Negative outcomes of watchlist edits.
#[derive(Debug, Error)]
pub enum WatchlistError {
    #[error(transparent)]
    InvalidSymbol(#[from] SymbolError),

    #[error("{0} is already being monitored")]
    AlreadyWatched(Symbol),

    #[error("{0} is not being monitored")]
    NotWatched(Symbol),

    /// The symbol could not be priced, so it was not added.
    #[error("could not verify {symbol}: {source}")]
    Lookup {
        symbol: Symbol,
        #[source]
        source: PriceError,
    },
}

impl WatchlistError {
    pub fn lookup(symbol: Symbol, source: PriceError) -> Self {
        Self::Lookup { symbol, source }
    }

    /// True for the "already in that state" family (duplicate add, unknown remove).
    #[must_use]
    pub const fn is_conflict(&self) -> bool {
        matches!(self, Self::AlreadyWatched(_) | Self::NotWatched(_))
    }
}
