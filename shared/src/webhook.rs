//! Client for the n8n question-answering webhook.

use serde_json::Value;
use tracing::{error, info, warn};

use crate::models::{Query, WebhookReply};
use crate::{Config, Error, Result};

/// Sends one question per call to the configured webhook.
pub struct WebhookClient {
    http_client: reqwest::Client,
    webhook_url: String,
}

impl WebhookClient {
    /// Create a client bound to the configured URL and timeout.
    pub fn new(config: &Config) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            webhook_url: config.webhook_url.clone(),
        })
    }

    /// POST the query and classify the reply.
    ///
    /// The body is parsed before the status is checked, so a non-JSON error
    /// page surfaces as [`Error::Parse`] rather than [`Error::Remote`].
    pub async fn ask(&self, query: &Query) -> Result<WebhookReply> {
        let response = self
            .http_client
            .post(&self.webhook_url)
            .json(query)
            .send()
            .await
            .map_err(|e| {
                error!("Webhook request failed: {}", e);
                Error::Transport(e)
            })?;

        let status = response.status().as_u16();
        let raw = response.text().await?;

        let body: Value = match serde_json::from_str(&raw) {
            Ok(body) => body,
            Err(e) => {
                warn!("Webhook returned non-JSON (HTTP {}): {}", status, e);
                return Err(Error::Parse { status, body: raw });
            }
        };

        if status >= 400 {
            warn!("Webhook returned HTTP {}", status);
            return Err(Error::Remote { status, body });
        }

        info!("Webhook answered with HTTP {} ({} bytes)", status, raw.len());
        Ok(WebhookReply { raw, body })
    }
}
