pub mod config;
pub mod config_loader;
pub mod error;
pub mod traits;
pub mod types;

pub use config::{AppConfig, ExchangeConfig, MonitorConfig, StorageConfig, TelegramConfig};
pub use config_loader::ConfigLoader;
pub use error::{PriceError, SinkError, StoreError, SymbolError};
pub use traits::{AlertSink, PriceSource, WatchlistStore};
pub use types::{AlertEvent, PriceSample, RecipientId, Symbol};
