//! Environment-driven configuration.

use secrecy::SecretString;

use crate::error::ConfigError;
use crate::groupme::GROUPME_API_BASE;

const DEFAULT_PORT: u16 = 8080;

/// Runtime configuration, built from environment variables.
#[derive(Debug)]
pub struct AppConfig {
    /// Opaque token authorizing outbound posts to the group.
    pub bot_id: SecretString,
    /// Port the webhook server listens on.
    pub port: u16,
    /// Post a short notice when a message yields no order blocks.
    pub notify_on_empty: bool,
    /// GroupMe API base URL (overridable for testing).
    pub api_base: String,
}

impl AppConfig {
    /// Build config from environment variables.
    ///
    /// `GROUPME_BOT_ID` is required; everything else has a default.
    pub fn from_env() -> Result<Self, ConfigError> {
        let bot_id = std::env::var("GROUPME_BOT_ID")
            .map_err(|_| ConfigError::MissingEnvVar("GROUPME_BOT_ID".into()))?;

        let port = match std::env::var("PORT") {
            Ok(raw) => raw.parse().map_err(|_| ConfigError::InvalidValue {
                key: "PORT".into(),
                message: format!("not a valid port number: {raw}"),
            })?,
            Err(_) => DEFAULT_PORT,
        };

        let notify_on_empty = std::env::var("ORDER_DIGEST_NOTIFY_EMPTY")
            .map(|raw| parse_bool_flag(&raw))
            .unwrap_or(false);

        let api_base =
            std::env::var("GROUPME_API_BASE").unwrap_or_else(|_| GROUPME_API_BASE.to_string());

        Ok(Self {
            bot_id: SecretString::from(bot_id),
            port,
            notify_on_empty,
            api_base,
        })
    }
}

fn parse_bool_flag(raw: &str) -> bool {
    matches!(raw.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes")
}
