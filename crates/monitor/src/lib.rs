pub mod controller;
pub mod detector;
pub mod error;
pub mod history;
pub mod monitor_loop;
pub mod service;
pub mod sink;
pub mod state;
pub mod store;
pub mod watchlist;

pub use controller::MonitorController;
pub use detector::{Detection, IncreaseDetector};
pub use error::WatchlistError;
pub use history::SlidingWindowHistory;
pub use monitor_loop::{CycleReport, PriceMonitor};
pub use service::{load_watchlist, AddOutcome, MonitorService, RemoveOutcome};
pub use sink::LogAlertSink;
pub use state::{MonitorState, MonitorStatus, StartOutcome, StopOutcome};
pub use store::{JsonWatchlistStore, MemoryWatchlistStore};
pub use watchlist::Watchlist;
