use crate::config::AppConfig;
use crate::types::RecipientId;
use anyhow::{Context, Result};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use std::path::Path;

/// Default location of the TOML configuration file.
pub const DEFAULT_CONFIG_PATH: &str = "config/Config.toml";

/// Plain environment variable holding the bot token.
pub const TELEGRAM_TOKEN_ENV: &str = "TELEGRAM_TOKEN";

/// Plain environment variable holding comma-separated authorized user ids.
pub const AUTHORIZED_USER_IDS_ENV: &str = "AUTHORIZED_USER_IDS";

pub struct ConfigLoader;

impl ConfigLoader {
    /// Loads application configuration from the default path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration files cannot be read or parsed.
    pub fn load() -> Result<AppConfig> {
        Self::load_from(DEFAULT_CONFIG_PATH)
    }

    /// Loads application configuration by merging defaults, a TOML file, and
    /// environment variables. A missing file is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the file or an environment variable cannot be parsed.
    pub fn load_from(path: impl AsRef<Path>) -> Result<AppConfig> {
        Self::extract(Self::figment(path.as_ref(), None))
    }

    /// Loads application configuration with a profile overlay
    /// (`Config.<profile>.toml` next to the base file).
    ///
    /// # Errors
    ///
    /// Returns an error if configuration files cannot be read or parsed.
    pub fn load_with_profile(path: impl AsRef<Path>, profile: &str) -> Result<AppConfig> {
        Self::extract(Self::figment(path.as_ref(), Some(profile)))
    }

    fn figment(path: &Path, profile: Option<&str>) -> Figment {
        let mut figment =
            Figment::from(Serialized::defaults(AppConfig::default())).merge(Toml::file(path));

        if let Some(profile) = profile {
            let overlay = path.with_file_name(format!("Config.{profile}.toml"));
            figment = figment.merge(Toml::file(overlay));
        }

        figment.merge(Env::prefixed("APP_").split("__"))
    }

    fn extract(figment: Figment) -> Result<AppConfig> {
        let mut config: AppConfig = figment.extract().context("invalid configuration")?;
        Self::apply_plain_env(&mut config)?;
        tracing::debug!(?config, "configuration loaded");
        Ok(config)
    }

    /// Applies `TELEGRAM_TOKEN` and `AUTHORIZED_USER_IDS`, which take
    /// precedence over every other source.
    fn apply_plain_env(config: &mut AppConfig) -> Result<()> {
        if let Ok(token) = std::env::var(TELEGRAM_TOKEN_ENV) {
            if !token.trim().is_empty() {
                config.telegram.token = Some(token.trim().to_string());
            }
        }

        if let Ok(raw) = std::env::var(AUTHORIZED_USER_IDS_ENV) {
            config.telegram.authorized_user_ids = parse_user_ids(&raw)
                .with_context(|| format!("invalid {AUTHORIZED_USER_IDS_ENV}"))?;
        }

        Ok(())
    }
}

/// Parses a comma-separated list of user ids, skipping empty entries.
///
/// # Errors
///
/// Returns an error if any entry is not an integer.
pub fn parse_user_ids(raw: &str) -> Result<Vec<RecipientId>> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<RecipientId>()
                .with_context(|| format!("not a user id: {s:?}"))
        })
        .collect()
}
