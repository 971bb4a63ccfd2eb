//! Outbound notifications.
//!
//! Every call site treats a send failure the same way: log it, never
//! escalate it. A job's terminal state and the status-read response are
//! unaffected by notification outcomes.

use crate::error::{Error, Result};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::Serialize;

/// A binary attachment for a notification.
#[derive(Debug, Clone)]
pub struct Attachment {
    pub filename: String,
    pub content_type: String,
    pub content: Vec<u8>,
}

/// Notification sender boundary.
#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    async fn send(
        &self,
        recipient: &str,
        subject: &str,
        html_body: &str,
        attachment: Option<Attachment>,
    ) -> Result<()>;
}

/// Posts notifications as JSON to a delivery webhook. The webhook side owns
/// actual email/chat delivery; this process only hands off the payload.
pub struct WebhookNotifier {
    client: reqwest::Client,
    endpoint: String,
}

#[derive(Serialize)]
struct WebhookPayload<'a> {
    recipient: &'a str,
    subject: &'a str,
    html_body: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    attachment: Option<WebhookAttachment<'a>>,
}

#[derive(Serialize)]
struct WebhookAttachment<'a> {
    filename: &'a str,
    content_type: &'a str,
    /// Base64-encoded bytes.
    content: String,
}

impl WebhookNotifier {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait::async_trait]
impl Notifier for WebhookNotifier {
    async fn send(
        &self,
        recipient: &str,
        subject: &str,
        html_body: &str,
        attachment: Option<Attachment>,
    ) -> Result<()> {
        let payload = WebhookPayload {
            recipient,
            subject,
            html_body,
            attachment: attachment.as_ref().map(|a| WebhookAttachment {
                filename: &a.filename,
                content_type: &a.content_type,
                content: BASE64.encode(&a.content),
            }),
        };

        let response = self
            .client
            .post(&self.endpoint)
            .json(&payload)
            .send()
            .await
            .map_err(|e| Error::Notify(format!("webhook post failed: {e}")))?;

        if !response.status().is_success() {
            return Err(Error::Notify(format!(
                "webhook answered {}",
                response.status()
            )));
        }
        Ok(())
    }
}

/// Discards notifications. Used when no webhook endpoint is configured.
pub struct NoopNotifier;

#[async_trait::async_trait]
impl Notifier for NoopNotifier {
    async fn send(
        &self,
        recipient: &str,
        _subject: &str,
        _html_body: &str,
        _attachment: Option<Attachment>,
    ) -> Result<()> {
        tracing::debug!(recipient, "notifications disabled, dropping");
        Ok(())
    }
}
