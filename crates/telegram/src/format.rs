use price_alert_core::{AlertEvent, MonitorConfig, Symbol};
use rust_decimal::Decimal;

pub(crate) const UNAUTHORIZED: &str = "⛔ You are not authorized to use this bot.";
pub(crate) const ALREADY_RUNNING: &str = "Monitoring is already active! 👀";
pub(crate) const NOTHING_TO_MONITOR: &str = "Please add trading pairs first using /add command";
pub(crate) const STOPPED: &str = "❌ Monitoring stopped!";
pub(crate) const ALREADY_STOPPED: &str = "Monitoring is already stopped! 😴";
pub(crate) const EMPTY_LIST: &str = "No trading pairs are being monitored.";
pub(crate) const ADD_USAGE: &str = "Please provide a trading pair symbol. Example: /add BTC";
pub(crate) const DELETE_USAGE: &str = "Please provide a trading pair symbol. Example: /delete BTC";
pub(crate) const NOT_SAVED: &str = "⚠️ The watchlist could not be saved and will be lost on restart.";

/// Renders user-facing texts with the configured rule and quote asset.
#[derive(Debug, Clone)]
pub struct MessageFormatter {
    quote_asset: String,
    threshold_pct: f64,
    window_label: String,
}

impl MessageFormatter {
    #[must_use]
    pub fn new(monitor: &MonitorConfig, quote_asset: impl Into<String>) -> Self {
        Self {
            quote_asset: quote_asset.into(),
            threshold_pct: monitor.threshold_pct,
            window_label: monitor.window_label(),
        }
    }

    #[must_use]
    pub fn alert(&self, alert: &AlertEvent) -> String {
        format!(
            "🚀 *PRICE ALERT* 🚀\n{} has increased by {:.2}% in the last {}!\nCurrent price: ${}",
            alert.symbol.pair(&self.quote_asset),
            alert.percent_increase,
            self.window_label,
            display_price(alert.current_price),
        )
    }

    #[must_use]
    pub fn started(&self) -> String {
        format!(
            "✅ Monitoring started! I'll alert you when prices increase by {}%+ in {}.",
            self.threshold_pct, self.window_label
        )
    }

    #[must_use]
    pub fn list(&self, symbols: &[Symbol]) -> String {
        if symbols.is_empty() {
            return EMPTY_LIST.to_string();
        }
        let joined = symbols
            .iter()
            .map(Symbol::as_str)
            .collect::<Vec<_>>()
            .join(" ");
        format!("📋 Monitored trading pairs: {joined}")
    }

    #[must_use]
    pub fn added(&self, symbol: &Symbol, price: Decimal) -> String {
        format!(
            "✅ Added {} for monitoring.\nCurrent price: ${}",
            symbol.pair(&self.quote_asset),
            display_price(price)
        )
    }

    #[must_use]
    pub fn removed(&self, symbol: &Symbol) -> String {
        format!("✅ Removed {} from monitoring.", symbol.pair(&self.quote_asset))
    }

    #[must_use]
    pub fn not_found(&self, raw: &str) -> String {
        format!("❌ Could not find trading pair {}/{}", raw, self.quote_asset)
    }

    #[must_use]
    pub fn already_watched(symbol: &str) -> String {
        format!("{symbol} is already being monitored.")
    }

    #[must_use]
    pub fn not_watched(symbol: &str) -> String {
        format!("{symbol} is not being monitored.")
    }

    #[must_use]
    pub fn help(&self) -> String {
        format!(
            "📊 *Price Alert Bot Commands* 📊\n\n\
             /start - Start monitoring price changes\n\
             /end - Stop monitoring price changes\n\
             /list - List all trading pairs being monitored\n\
             /add SYMBOL - Add a trading pair (e.g. /add BTC)\n\
             /delete SYMBOL - Remove a trading pair (e.g. /delete BTC)\n\
             /help - Show this help message\n\n\
             The bot monitors for {}%+ price increases in {} windows.",
            self.threshold_pct,
            self.window_label.trim_end_matches('s'),
        )
    }
}

/// Price without trailing zeros (`65000.12000000` -> `65000.12`).
fn display_price(price: Decimal) -> Decimal {
    price.normalize()
}
