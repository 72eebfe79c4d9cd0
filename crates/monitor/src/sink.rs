use async_trait::async_trait;
use price_alert_core::{AlertEvent, AlertSink, RecipientId, SinkError};

/// Writes alerts to the log. Used when no chat front-end is configured.
#[derive(Debug, Clone)]
pub struct LogAlertSink {
    quote_asset: String,
}

impl LogAlertSink {
    #[must_use]
    pub fn new(quote_asset: impl Into<String>) -> Self {
        Self {
            quote_asset: quote_asset.into(),
        }
    }
}

impl Default for LogAlertSink {
    fn default() -> Self {
        Self::new("USDT")
    }
}

#[async_trait]
impl AlertSink for LogAlertSink {
    async fn deliver(
        &self,
        alert: &AlertEvent,
        recipients: &[RecipientId],
    ) -> Result<(), SinkError> {
        tracing::info!(
            pair = %alert.symbol.pair(&self.quote_asset),
            percent = %format_args!("{:.2}", alert.percent_increase),
            price = %alert.current_price,
            recipients = recipients.len(),
            "PRICE ALERT"
        );
        Ok(())
    }
}
