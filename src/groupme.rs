//! GroupMe outbound notifier — posts bot messages via the v3 API.
//!
//! Fire-and-forget by design: callers log failures and move on, nothing is
//! retried or escalated.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};

use crate::error::NotifyError;

/// Default GroupMe API base.
pub const GROUPME_API_BASE: &str = "https://api.groupme.com/v3";

/// Outbound notification seam — anything that can post text to the chat.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Post `text` to the chat group.
    async fn notify(&self, text: &str) -> Result<(), NotifyError>;
}

/// Posts messages to a GroupMe group as the bot.
pub struct GroupMeBot {
    bot_id: SecretString,
    api_base: String,
    client: reqwest::Client,
}

impl GroupMeBot {
    pub fn new(bot_id: SecretString) -> Self {
        Self::with_api_base(bot_id, GROUPME_API_BASE.to_string())
    }

    /// Use a non-default API base. Tests point this at a local listener.
    pub fn with_api_base(bot_id: SecretString, api_base: String) -> Self {
        Self {
            bot_id,
            api_base,
            client: reqwest::Client::new(),
        }
    }

    fn post_url(&self) -> String {
        format!("{}/bots/post", self.api_base)
    }
}

#[async_trait]
impl Notifier for GroupMeBot {
    async fn notify(&self, text: &str) -> Result<(), NotifyError> {
        let body = serde_json::json!({
            "bot_id": self.bot_id.expose_secret(),
            "text": text,
        });

        let resp = self
            .client
            .post(self.post_url())
            .json(&body)
            .send()
            .await
            .map_err(|e| NotifyError::SendFailed {
                reason: e.to_string(),
            })?;

        if !resp.status().is_success() {
            let status = resp.status();
            let detail = resp.text().await.unwrap_or_default();
            return Err(NotifyError::SendFailed {
                reason: format!("bots/post returned {status}: {detail}"),
            });
        }

        tracing::debug!(bytes = text.len(), "report posted to GroupMe");
        Ok(())
    }
}
