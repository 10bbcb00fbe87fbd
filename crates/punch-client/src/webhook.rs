//! Reminder webhook delivery
//!
//! Reminders are plain-text POSTs with ntfy-style headers, so an ntfy
//! topic or any compatible receiver works as a target.

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

use crate::{ClientError, ClientResult};

const DELIVERY_TIMEOUT: Duration = Duration::from_secs(10);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Fallback body for empty messages
const DEFAULT_MESSAGE: &str = "Work time notification";

/// Reminder delivery target
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, url: &str, message: &str) -> ClientResult<()>;
}

/// Webhook-based notifier
pub struct WebhookClient {
    client: Client,
}

impl WebhookClient {
    pub fn new() -> Self {
        let client = Client::builder()
            .timeout(DELIVERY_TIMEOUT)
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .expect("Failed to create HTTP client");

        Self { client }
    }
}

impl Default for WebhookClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Notifier for WebhookClient {
    async fn notify(&self, url: &str, message: &str) -> ClientResult<()> {
        let body = if message.is_empty() {
            DEFAULT_MESSAGE
        } else {
            message
        };

        let response = self
            .client
            .post(url)
            .header("Title", "Work Time Reminder")
            .header("Priority", "urgent")
            .header("Tags", "warning")
            .header("Content-Type", "text/plain")
            .body(body.to_string())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Status(status.as_u16()));
        }

        debug!(url = %url, "Reminder delivered");
        Ok(())
    }
}
