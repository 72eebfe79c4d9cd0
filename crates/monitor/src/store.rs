//! Watchlist persistence.
//!
//! The on-disk format is a JSON array of plain tickers:
//!
//! ```json
//! ["BTC", "ETH"]
//! ```

use parking_lot::Mutex;
use price_alert_core::{StoreError, Symbol, WatchlistStore};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info};

/// Stores the watchlist in a JSON file.
#[derive(Debug, Clone)]
pub struct JsonWatchlistStore {
    path: PathBuf,
}

impl JsonWatchlistStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn dir(&self) -> &Path {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    }
}

impl WatchlistStore for JsonWatchlistStore {
    /// A missing file is an empty watchlist.
    fn load(&self) -> Result<Vec<Symbol>, StoreError> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no watchlist file, starting empty");
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        };

        let symbols: Vec<Symbol> = serde_json::from_reader(BufReader::new(file))
            .map_err(|e| StoreError::Corrupt(format!("{}: {e}", self.path.display())))?;

        info!(
            path = %self.path.display(),
            count = symbols.len(),
            "loaded watchlist"
        );
        Ok(symbols)
    }

    /// Writes to a uniquely named sibling temp file, then renames it over
    /// the target. Concurrent saves never share a temp file.
    fn save(&self, symbols: &[Symbol]) -> Result<(), StoreError> {
        let dir = self.dir();
        fs::create_dir_all(dir)?;

        let mut temp = NamedTempFile::new_in(dir)?;
        {
            let mut writer = BufWriter::new(temp.as_file_mut());
            serde_json::to_writer_pretty(&mut writer, symbols)
                .map_err(|e| StoreError::Corrupt(e.to_string()))?;
            writer.flush()?;
        }
        temp.persist(&self.path).map_err(|e| StoreError::Io(e.error))?;

        debug!(path = %self.path.display(), count = symbols.len(), "saved watchlist");
        Ok(())
    }
}

/// Keeps the watchlist in memory only.
#[derive(Debug, Default)]
pub struct MemoryWatchlistStore {
    symbols: Mutex<Vec<Symbol>>,
}

impl MemoryWatchlistStore {
    #[must_use]
    pub fn new(symbols: Vec<Symbol>) -> Self {
        Self {
            symbols: Mutex::new(symbols),
        }
    }
}

impl WatchlistStore for MemoryWatchlistStore {
    fn load(&self) -> Result<Vec<Symbol>, StoreError> {
        Ok(self.symbols.lock().clone())
    }

    fn save(&self, symbols: &[Symbol]) -> Result<(), StoreError> {
        *self.symbols.lock() = symbols.to_vec();
        Ok(())
    }
}
