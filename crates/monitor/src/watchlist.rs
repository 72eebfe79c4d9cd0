use parking_lot::RwLock;
use price_alert_core::Symbol;
use std::sync::Arc;

/// Shared set of watched symbols in insertion order.
///
/// Cloning yields another handle to the same list. The monitor loop reads a
/// [`snapshot`](Self::snapshot) once per cycle; control handlers mutate it
/// concurrently.
#[derive(Debug, Clone, Default)]
pub struct Watchlist {
    symbols: Arc<RwLock<Vec<Symbol>>>,
}

impl Watchlist {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a watchlist from stored symbols, dropping duplicates.
    #[must_use]
    pub fn from_symbols(symbols: impl IntoIterator<Item = Symbol>) -> Self {
        let list = Self::new();
        for symbol in symbols {
            list.insert(symbol);
        }
        list
    }

    /// Adds a symbol. Returns false if it was already present.
    pub fn insert(&self, symbol: Symbol) -> bool {
        let mut symbols = self.symbols.write();
        if symbols.contains(&symbol) {
            return false;
        }
        symbols.push(symbol);
        true
    }

    /// Removes a symbol. Returns false if it was not present.
    pub fn remove(&self, symbol: &Symbol) -> bool {
        let mut symbols = self.symbols.write();
        let before = symbols.len();
        symbols.retain(|s| s != symbol);
        symbols.len() != before
    }

    #[must_use]
    pub fn contains(&self, symbol: &Symbol) -> bool {
        self.symbols.read().contains(symbol)
    }

    #[must_use]
    pub fn snapshot(&self) -> Vec<Symbol> {
        self.symbols.read().clone()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.symbols.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.symbols.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sym(s: &str) -> Symbol {
        Symbol::parse(s).unwrap()
    }

    #[test]
    fn insert_rejects_duplicates() {
        let list = Watchlist::new();
        assert!(list.insert(sym("BTC")));
        assert!(!list.insert(sym("btc")));
        assert_eq!(list.snapshot(), vec![sym("BTC")]);
    }

    #[test]
    fn keeps_insertion_order() {
        let list = Watchlist::from_symbols([sym("SOL"), sym("BTC"), sym("SOL"), sym("ETH")]);
        assert_eq!(list.snapshot(), vec![sym("SOL"), sym("BTC"), sym("ETH")]);
    }

    #[test]
    fn remove_reports_presence() {
        let list = Watchlist::from_symbols([sym("BTC")]);
        assert!(!list.remove(&sym("ETH")));
        assert!(list.remove(&sym("BTC")));
        assert!(list.is_empty());
    }

    #[test]
    fn clones_share_state() {
        let list = Watchlist::new();
        let other = list.clone();
        other.insert(sym("DOGE"));
        assert!(list.contains(&sym("DOGE")));
        assert_eq!(list.len(), 1);
    }
}
