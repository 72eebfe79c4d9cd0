use crate::client::{ParseMode, TelegramClient};
use crate::format::MessageFormatter;
use async_trait::async_trait;
use price_alert_core::{AlertEvent, AlertSink, RecipientId, SinkError};
use std::sync::Arc;
use tracing::{error, info};

/// Sends price alerts as Telegram messages.
pub struct TelegramAlertSink {
    client: Arc<TelegramClient>,
    formatter: MessageFormatter,
}

impl TelegramAlertSink {
    #[must_use]
    pub const fn new(client: Arc<TelegramClient>, formatter: MessageFormatter) -> Self {
        Self { client, formatter }
    }
}

#[async_trait]
impl AlertSink for TelegramAlertSink {
    /// Sends to every recipient; one failed chat does not stop the rest.
    async fn deliver(
        &self,
        alert: &AlertEvent,
        recipients: &[RecipientId],
    ) -> Result<(), SinkError> {
        let text = self.formatter.alert(alert);
        let mut failed = 0;
        let mut last_error = String::new();

        for &chat_id in recipients {
            if let Err(e) = self
                .client
                .send_message(chat_id, &text, Some(ParseMode::Markdown))
                .await
            {
                error!(chat_id, symbol = %alert.symbol, error = %e, "alert not delivered");
                failed += 1;
                last_error = e.to_string();
            }
        }

        if failed > 0 {
            return Err(SinkError::delivery(failed, recipients.len(), last_error));
        }

        info!(
            symbol = %alert.symbol,
            percent = %format_args!("{:.2}", alert.percent_increase),
            recipients = recipients.len(),
            "alert sent"
        );
        Ok(())
    }
}
