//! Webhook notifier: POSTs the run outcome as JSON.

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info};

use vaultit_core::notify::{Notifier, NotifyPayload};
use vaultit_core::{Error, Result};

/// Fixed delivery timeout; a slow endpoint must never stall a run.
const NOTIFY_TIMEOUT: Duration = Duration::from_secs(10);

/// Notifier that POSTs the payload to a webhook URL.
pub struct WebhookNotifier {
    client: reqwest::Client,
    url: String,
}

impl WebhookNotifier {
    pub fn new(url: String) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(NOTIFY_TIMEOUT)
            .build()
            .map_err(|e| Error::NotifyFailed(e.to_string()))?;
        Ok(Self { client, url })
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn notify(&self, payload: &NotifyPayload) -> Result<()> {
        debug!(url = %self.url, "Sending webhook notification");

        let response = self
            .client
            .post(&self.url)
            .json(payload)
            .send()
            .await
            .map_err(|e| Error::NotifyFailed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Error::NotifyFailed(format!(
                "webhook returned {}",
                response.status()
            )));
        }

        info!(url = %self.url, "Webhook notification sent");
        Ok(())
    }
}
