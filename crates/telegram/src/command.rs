/// A slash command understood by the bot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BotCommand {
    Start,
    End,
    List,
    /// `/add SYMBOL`; the argument is upper-cased, `None` if missing.
    Add(Option<String>),
    /// `/delete SYMBOL`.
    Delete(Option<String>),
    Help,
}

impl BotCommand {
    /// Parses a message text.
    ///
    /// Returns `None` for plain text, unknown commands, and commands
    /// addressed to another bot (`/list@other_bot`).
    #[must_use]
    pub fn parse(text: &str, bot_username: Option<&str>) -> Option<Self> {
        let mut parts = text.split_whitespace();
        let head = parts.next()?.strip_prefix('/')?;

        let name = match head.split_once('@') {
            Some((name, target)) => {
                if let Some(me) = bot_username {
                    if !target.eq_ignore_ascii_case(me) {
                        return None;
                    }
                }
                name
            }
            None => head,
        };

        let arg = parts.next().map(str::to_uppercase);

        match name.to_ascii_lowercase().as_str() {
            "start" => Some(Self::Start),
            "end" => Some(Self::End),
            "list" => Some(Self::List),
            "add" => Some(Self::Add(arg)),
            "delete" => Some(Self::Delete(arg)),
            "help" => Some(Self::Help),
            _ => None,
        }
    }

    /// Whether the command needs an authorized sender.
    #[must_use]
    pub const fn requires_auth(&self) -> bool {
        !matches!(self, Self::Help)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_simple_commands() {
        assert_eq!(BotCommand::parse("/start", None), Some(BotCommand::Start));
        assert_eq!(BotCommand::parse("/end", None), Some(BotCommand::End));
        assert_eq!(BotCommand::parse("  /list  ", None), Some(BotCommand::List));
        assert_eq!(BotCommand::parse("/help", None), Some(BotCommand::Help));
    }

    #[test]
    fn uppercases_argument() {
        assert_eq!(
            BotCommand::parse("/add btc", None),
            Some(BotCommand::Add(Some("BTC".to_string())))
        );
        assert_eq!(
            BotCommand::parse("/delete eth extra", None),
            Some(BotCommand::Delete(Some("ETH".to_string())))
        );
        assert_eq!(BotCommand::parse("/add", None), Some(BotCommand::Add(None)));
    }

    #[test]
    fn honours_bot_mention() {
        assert_eq!(
            BotCommand::parse("/list@price_bot", Some("price_bot")),
            Some(BotCommand::List)
        );
        assert_eq!(
            BotCommand::parse("/list@Price_Bot", Some("price_bot")),
            Some(BotCommand::List)
        );
        assert_eq!(BotCommand::parse("/list@other_bot", Some("price_bot")), None);
        assert_eq!(
            BotCommand::parse("/start@anything", None),
            Some(BotCommand::Start)
        );
    }

    #[test]
    fn ignores_non_commands() {
        assert_eq!(BotCommand::parse("hello", None), None);
        assert_eq!(BotCommand::parse("/unknown", None), None);
        assert_eq!(BotCommand::parse("", None), None);
    }

    #[test]
    fn only_help_is_public() {
        assert!(!BotCommand::Help.requires_auth());
        assert!(BotCommand::Start.requires_auth());
        assert!(BotCommand::Add(None).requires_auth());
    }
}
