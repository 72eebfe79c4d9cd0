//! Command handling and the long-poll dispatch loop.

use crate::auth::Authorizer;
use crate::client::{ParseMode, TelegramClient};
use crate::command::BotCommand;
use crate::format::{self, MessageFormatter};
use crate::types::Update;
use price_alert_core::RecipientId;
use price_alert_monitor::{MonitorService, StartOutcome, StopOutcome, WatchlistError};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

/// Delay after a failed `getUpdates` when the error suggests none.
const POLL_RETRY_SECS: u64 = 3;

/// Text to send back for a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub parse_mode: Option<ParseMode>,
}

impl Reply {
    fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            parse_mode: None,
        }
    }

    fn markdown(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            parse_mode: Some(ParseMode::Markdown),
        }
    }
}

/// Turns authorized commands into monitor operations and replies.
pub struct CommandHandler {
    service: Arc<MonitorService>,
    auth: Authorizer,
    formatter: MessageFormatter,
}

impl CommandHandler {
    #[must_use]
    pub fn new(
        service: Arc<MonitorService>,
        auth: Authorizer,
        formatter: MessageFormatter,
    ) -> Self {
        Self {
            service,
            auth,
            formatter,
        }
    }

    /// Handles one command from `user_id`.
    pub async fn handle(&self, user_id: RecipientId, command: BotCommand) -> Reply {
        if command.requires_auth() && !self.auth.is_authorized(user_id) {
            warn!(user_id, ?command, "unauthorized access attempt");
            return Reply::plain(format::UNAUTHORIZED);
        }

        match command {
            BotCommand::Start => self.start(user_id).await,
            BotCommand::End => self.end(user_id).await,
            BotCommand::List => Reply::plain(self.formatter.list(&self.service.list_symbols())),
            BotCommand::Add(None) => Reply::plain(format::ADD_USAGE),
            BotCommand::Add(Some(raw)) => self.add(user_id, &raw).await,
            BotCommand::Delete(None) => Reply::plain(format::DELETE_USAGE),
            BotCommand::Delete(Some(raw)) => self.delete(user_id, &raw),
            BotCommand::Help => Reply::markdown(self.formatter.help()),
        }
    }

    async fn start(&self, user_id: RecipientId) -> Reply {
        match self.service.request_start().await {
            StartOutcome::Started => {
                info!(user_id, "monitoring started by user");
                Reply::plain(self.formatter.started())
            }
            StartOutcome::AlreadyRunning => Reply::plain(format::ALREADY_RUNNING),
            StartOutcome::NothingToMonitor => Reply::plain(format::NOTHING_TO_MONITOR),
        }
    }

    async fn end(&self, user_id: RecipientId) -> Reply {
        match self.service.request_stop().await {
            StopOutcome::Stopped => {
                info!(user_id, "monitoring stopped by user");
                Reply::plain(format::STOPPED)
            }
            StopOutcome::AlreadyStopped => Reply::plain(format::ALREADY_STOPPED),
        }
    }

    async fn add(&self, user_id: RecipientId, raw: &str) -> Reply {
        match self.service.add_symbol(raw).await {
            Ok(outcome) => {
                info!(user_id, symbol = %outcome.symbol, "added by user");
                let mut text = self.formatter.added(&outcome.symbol, outcome.price);
                if outcome.persist_error.is_some() {
                    text.push('\n');
                    text.push_str(format::NOT_SAVED);
                }
                Reply::plain(text)
            }
            Err(WatchlistError::AlreadyWatched(symbol)) => {
                Reply::plain(MessageFormatter::already_watched(symbol.as_str()))
            }
            Err(WatchlistError::Lookup { symbol, source }) => {
                warn!(%symbol, error = %source, "could not verify symbol");
                Reply::plain(self.formatter.not_found(symbol.as_str()))
            }
            Err(WatchlistError::InvalidSymbol(_)) => Reply::plain(self.formatter.not_found(raw)),
            Err(WatchlistError::NotWatched(symbol)) => {
                Reply::plain(MessageFormatter::not_watched(symbol.as_str()))
            }
        }
    }

    fn delete(&self, user_id: RecipientId, raw: &str) -> Reply {
        match self.service.remove_symbol(raw) {
            Ok(outcome) => {
                info!(user_id, symbol = %outcome.symbol, "deleted by user");
                let mut text = self.formatter.removed(&outcome.symbol);
                if outcome.persist_error.is_some() {
                    text.push('\n');
                    text.push_str(format::NOT_SAVED);
                }
                Reply::plain(text)
            }
            Err(WatchlistError::NotWatched(symbol)) => {
                Reply::plain(MessageFormatter::not_watched(symbol.as_str()))
            }
            Err(_) => Reply::plain(MessageFormatter::not_watched(raw)),
        }
    }
}

/// Long-polls the Bot API and dispatches each command on its own task.
pub struct TelegramBot {
    client: Arc<TelegramClient>,
    handler: Arc<CommandHandler>,
    bot_username: Option<String>,
}

impl TelegramBot {
    #[must_use]
    pub fn new(client: Arc<TelegramClient>, handler: Arc<CommandHandler>) -> Self {
        Self {
            client,
            handler,
            bot_username: None,
        }
    }

    /// Commands mentioning another bot (`/list@other_bot`) are ignored.
    #[must_use]
    pub fn with_bot_username(mut self, username: impl Into<String>) -> Self {
        self.bot_username = Some(username.into());
        self
    }

    /// Polls until `stop` turns true or its sender goes away.
    pub async fn run(self, mut stop: watch::Receiver<bool>) {
        info!(username = ?self.bot_username, "telegram bot polling");
        let mut offset: Option<i64> = None;

        loop {
            if *stop.borrow() {
                break;
            }

            let polled = tokio::select! {
                result = self.client.get_updates(offset) => result,
                changed = stop.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    continue;
                }
            };

            match polled {
                Ok(updates) => {
                    for update in updates {
                        offset = Some(update.update_id + 1);
                        self.dispatch(update);
                    }
                }
                Err(e) => {
                    let delay = e.retry_delay_secs().unwrap_or(POLL_RETRY_SECS);
                    if e.is_transient() {
                        warn!(error = %e, delay_secs = delay, "getUpdates failed");
                    } else {
                        error!(error = %e, delay_secs = delay, "getUpdates rejected");
                    }
                    tokio::select! {
                        () = tokio::time::sleep(Duration::from_secs(delay)) => {}
                        changed = stop.changed() => {
                            if changed.is_err() {
                                break;
                            }
                        }
                    }
                }
            }
        }

        info!("telegram bot stopped");
    }

    fn dispatch(&self, update: Update) {
        let Some(message) = update.message else {
            return;
        };
        let (Some(from), Some(text)) = (message.from, message.text) else {
            return;
        };
        let Some(command) = BotCommand::parse(&text, self.bot_username.as_deref()) else {
            debug!(update_id = update.update_id, "ignoring non-command message");
            return;
        };

        let client = Arc::clone(&self.client);
        let handler = Arc::clone(&self.handler);
        let chat_id = message.chat.id;
        tokio::spawn(async move {
            let reply = handler.handle(from.id, command).await;
            if let Err(e) = client
                .send_message(chat_id, &reply.text, reply.parse_mode)
                .await
            {
                error!(chat_id, error = %e, "failed to send reply");
            }
        });
    }
}
