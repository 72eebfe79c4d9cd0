use crate::controller::MonitorController;
use crate::error::WatchlistError;
use crate::state::{MonitorStatus, StartOutcome, StopOutcome};
use crate::watchlist::Watchlist;
use price_alert_core::{
    AlertSink, MonitorConfig, PriceError, PriceSource, RecipientId, StoreError, Symbol,
    WatchlistStore,
};
use parking_lot::Mutex;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{error, info};

/// A symbol that was added, with the price that verified it.
#[derive(Debug)]
pub struct AddOutcome {
    pub symbol: Symbol,
    pub price: Decimal,
    /// Set when the watchlist changed in memory but could not be saved.
    pub persist_error: Option<StoreError>,
}

#[derive(Debug)]
pub struct RemoveOutcome {
    pub symbol: Symbol,
    pub persist_error: Option<StoreError>,
}

/// Control surface over the watchlist and the monitor loop.
///
/// Authorization is the caller's job.
pub struct MonitorService {
    watchlist: Watchlist,
    store: Arc<dyn WatchlistStore>,
    source: Arc<dyn PriceSource>,
    controller: MonitorController,
    /// Serializes snapshot-and-save so the last write holds the latest list.
    save_lock: Mutex<()>,
}

impl MonitorService {
    /// Builds the service, seeding the watchlist from `store`.
    ///
    /// A store that cannot be read is logged and treated as empty.
    #[must_use]
    pub fn new(
        config: MonitorConfig,
        store: Arc<dyn WatchlistStore>,
        source: Arc<dyn PriceSource>,
        sink: Arc<dyn AlertSink>,
        recipients: Vec<RecipientId>,
    ) -> Self {
        let watchlist = load_watchlist(store.as_ref());
        Self::with_watchlist(config, watchlist, store, source, sink, recipients)
    }

    /// Like [`new`](Self::new), but a store that cannot be read is an error
    /// instead of an empty watchlist.
    ///
    /// # Errors
    /// Returns the store's load error.
    pub fn open(
        config: MonitorConfig,
        store: Arc<dyn WatchlistStore>,
        source: Arc<dyn PriceSource>,
        sink: Arc<dyn AlertSink>,
        recipients: Vec<RecipientId>,
    ) -> Result<Self, StoreError> {
        let watchlist = Watchlist::from_symbols(store.load()?);
        Ok(Self::with_watchlist(
            config, watchlist, store, source, sink, recipients,
        ))
    }

    fn with_watchlist(
        config: MonitorConfig,
        watchlist: Watchlist,
        store: Arc<dyn WatchlistStore>,
        source: Arc<dyn PriceSource>,
        sink: Arc<dyn AlertSink>,
        recipients: Vec<RecipientId>,
    ) -> Self {
        let controller = MonitorController::new(
            config,
            watchlist.clone(),
            Arc::clone(&source),
            sink,
            recipients,
        );
        Self {
            watchlist,
            store,
            source,
            controller,
            save_lock: Mutex::new(()),
        }
    }

    pub async fn request_start(&self) -> StartOutcome {
        self.controller.start().await
    }

    pub async fn request_stop(&self) -> StopOutcome {
        self.controller.stop().await
    }

    pub async fn status(&self) -> MonitorStatus {
        self.controller.status().await
    }

    #[must_use]
    pub fn list_symbols(&self) -> Vec<Symbol> {
        self.watchlist.snapshot()
    }

    /// Validates `raw`, confirms it has a price, then adds and persists it.
    ///
    /// # Errors
    /// Invalid format, a symbol already watched, or a failed lookup. The
    /// watchlist is unchanged in each case.
    pub async fn add_symbol(&self, raw: &str) -> Result<AddOutcome, WatchlistError> {
        let symbol = Symbol::parse(raw)?;
        if self.watchlist.contains(&symbol) {
            return Err(WatchlistError::AlreadyWatched(symbol));
        }

        let price = match self.source.fetch_price(&symbol).await {
            Ok(price) if price > Decimal::ZERO => price,
            Ok(price) => {
                let err = PriceError::invalid_price(&symbol, price);
                return Err(WatchlistError::lookup(symbol, err));
            }
            Err(e) => return Err(WatchlistError::lookup(symbol, e)),
        };

        // Lost a race with a concurrent add of the same symbol.
        if !self.watchlist.insert(symbol.clone()) {
            return Err(WatchlistError::AlreadyWatched(symbol));
        }
        info!(%symbol, %price, "symbol added to watchlist");

        Ok(AddOutcome {
            symbol,
            price,
            persist_error: self.persist(),
        })
    }

    /// Removes `raw` from the watchlist and persists the change.
    ///
    /// # Errors
    /// Invalid format or a symbol that is not watched.
    pub fn remove_symbol(&self, raw: &str) -> Result<RemoveOutcome, WatchlistError> {
        let symbol = Symbol::parse(raw)?;
        if !self.watchlist.remove(&symbol) {
            return Err(WatchlistError::NotWatched(symbol));
        }
        info!(%symbol, "symbol removed from watchlist");

        Ok(RemoveOutcome {
            symbol,
            persist_error: self.persist(),
        })
    }

    fn persist(&self) -> Option<StoreError> {
        let _guard = self.save_lock.lock();
        let result = self.store.save(&self.watchlist.snapshot());
        if let Err(e) = &result {
            error!(error = %e, "failed to persist watchlist");
        }
        result.err()
    }
}

/// Reads the stored watchlist; unreadable data starts an empty one.
#[must_use]
pub fn load_watchlist(store: &dyn WatchlistStore) -> Watchlist {
    match store.load() {
        Ok(symbols) => Watchlist::from_symbols(symbols),
        Err(e) => {
            error!(error = %e, "could not load watchlist, starting empty");
            Watchlist::new()
        }
    }
}
