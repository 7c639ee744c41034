//! Discord webhook sink — posts alerts with `wait=true` so the created
//! message id comes back, and edits them in place through the webhook's
//! `/messages/{id}` endpoint.

use async_trait::async_trait;

use raidwatch_core::error::{RaidWatchError, Result};
use raidwatch_scheduler::sink::{MessageId, NotifierSink, RenderedAlert};

const WEBHOOK_PREFIXES: [&str; 2] = [
    "https://discord.com/api/webhooks/",
    "https://discordapp.com/api/webhooks/",
];

/// Webhook-backed notifier sink.
pub struct DiscordWebhook {
    post_url: String,
    edit_base: String,
    client: reqwest::Client,
}

impl DiscordWebhook {
    /// Parse the webhook URL up front; a malformed one is a startup error.
    pub fn new(webhook_url: &str) -> Result<Self> {
        let (id, token) = parse_webhook_url(webhook_url)?;
        let separator = if webhook_url.contains('?') { '&' } else { '?' };
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .map_err(|e| RaidWatchError::Config(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            post_url: format!("{webhook_url}{separator}wait=true"),
            edit_base: format!("https://discord.com/api/webhooks/{id}/{token}/messages"),
            client,
        })
    }

    fn payload(alert: &RenderedAlert) -> serde_json::Value {
        serde_json::json!({
            "content": alert.content,
            "embeds": [alert.embed],
        })
    }
}

#[async_trait]
impl NotifierSink for DiscordWebhook {
    async fn send(&self, alert: &RenderedAlert) -> Result<MessageId> {
        let resp = self
            .client
            .post(&self.post_url)
            .json(&Self::payload(alert))
            .send()
            .await
            .map_err(|e| RaidWatchError::Sink(format!("Discord send failed: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(RaidWatchError::Sink(format!(
                "Discord webhook error {status}: {body}"
            )));
        }

        let body: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| RaidWatchError::Sink(format!("Invalid webhook response: {e}")))?;
        let id = body["id"]
            .as_str()
            .ok_or_else(|| RaidWatchError::sink("No message id in webhook response"))?;
        tracing::debug!("✅ Discord message created (id {id})");
        Ok(MessageId(id.to_string()))
    }

    async fn edit(&self, id: &MessageId, alert: &RenderedAlert) -> Result<()> {
        let url = format!("{}/{}", self.edit_base, id.0);
        let resp = self
            .client
            .patch(&url)
            .json(&Self::payload(alert))
            .send()
            .await
            .map_err(|e| RaidWatchError::Sink(format!("Discord edit failed: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(RaidWatchError::Sink(format!(
                "Discord edit error {status}: {body}"
            )));
        }
        tracing::debug!("✏️ Discord message edited (id {id})");
        Ok(())
    }
}

/// Extract (id, token) from a webhook URL, ignoring any query string.
fn parse_webhook_url(url: &str) -> Result<(String, String)> {
    let rest = WEBHOOK_PREFIXES
        .iter()
        .find_map(|prefix| url.strip_prefix(prefix))
        .ok_or_else(|| {
            RaidWatchError::config("webhook URL is not a Discord webhook endpoint")
        })?;
    let mut parts = rest.splitn(2, '/');
    let id = parts.next().unwrap_or_default();
    let token = parts
        .next()
        .unwrap_or_default()
        .split(['/', '?'])
        .next()
        .unwrap_or_default();
    if id.is_empty() || token.is_empty() {
        return Err(RaidWatchError::config(
            "webhook URL is missing its id or token",
        ));
    }
    Ok((id.to_string(), token.to_string()))
}
