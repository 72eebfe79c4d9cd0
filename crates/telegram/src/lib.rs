//! Telegram chat front-end.
//!
//! Authorized users control the monitor with slash commands; alerts are
//! delivered back to them as Markdown messages.
//!
//! - [`TelegramClient`]: Bot API over HTTPS (`getUpdates`, `sendMessage`)
//! - [`BotCommand`]: command parsing
//! - [`CommandHandler`]: authorization and replies
//! - [`TelegramBot`]: long-poll dispatch loop
//! - [`TelegramAlertSink`]: alert delivery

mod auth;
mod command;
mod format;

pub mod client;
pub mod control;
pub mod error;
pub mod notifier;
pub mod types;

pub use auth::Authorizer;
pub use client::{ParseMode, TelegramClient, TelegramClientConfig, TELEGRAM_API_URL};
pub use command::BotCommand;
pub use control::{CommandHandler, Reply, TelegramBot};
pub use error::{Result, TelegramError};
pub use format::MessageFormatter;
pub use notifier::TelegramAlertSink;
