//! Generic webhook notification channel.

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use super::NotificationChannel;
use crate::notification::events::NotificationEvent;
use crate::{Error, Result};

/// Webhook channel configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookConfig {
    /// Webhook URL.
    pub url: String,
    /// Name of the single JSON text field carrying the message.
    pub text_field: String,
}

impl WebhookConfig {
    pub fn new(url: impl Into<String>, text_field: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            text_field: text_field.into(),
        }
    }
}

/// Posts `{"<text_field>": "<message>"}` to a webhook URL.
pub struct WebhookChannel {
    config: WebhookConfig,
    client: Client,
}

impl WebhookChannel {
    pub fn with_client(config: WebhookConfig, client: Client) -> Self {
        Self { config, client }
    }

    /// Build the JSON payload.
    fn build_payload(&self, event: &NotificationEvent) -> serde_json::Value {
        let mut payload = serde_json::Map::new();
        payload.insert(
            self.config.text_field.clone(),
            serde_json::Value::String(event.message()),
        );
        serde_json::Value::Object(payload)
    }
}

#[async_trait]
impl NotificationChannel for WebhookChannel {
    fn channel_type(&self) -> &'static str {
        "webhook"
    }

    fn is_enabled(&self) -> bool {
        !self.config.url.is_empty()
    }

    async fn send(&self, event: &NotificationEvent) -> Result<()> {
        if !self.is_enabled() {
            return Ok(());
        }

        let payload = self.build_payload(event);

        let response = self
            .client
            .post(&self.config.url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| Error::Other(format!("Webhook request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Other(format!(
                "Webhook failed: {} - {}",
                status, body
            )));
        }

        debug!("Webhook notification sent: {}", event.event_type());
        Ok(())
    }
}
