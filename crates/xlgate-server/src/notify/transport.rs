//! Notification transports
//!
//! Delivery is an external capability behind [`NotificationTransport`]:
//! best-effort, independent per recipient, no retry policy in the core.

use async_trait::async_trait;
use bytes::Bytes;
use serde::Serialize;
use tracing::info;

use crate::file::FileSource;

/// File attached to a notification.
#[derive(Debug, Clone)]
pub struct Attachment {
    pub filename: String,
    pub content_type: String,
    pub content: Bytes,
}

impl Attachment {
    /// Snapshot the uploaded file for attaching to a report.
    pub fn from_file(file: &dyn FileSource) -> std::io::Result<Self> {
        Ok(Self {
            filename: file.name().to_string(),
            content_type: file.content_type().to_string(),
            content: file.read()?,
        })
    }
}

/// Delivery mechanism for one recipient at a time
#[async_trait]
pub trait NotificationTransport: Send + Sync {
    async fn deliver(
        &self,
        recipient: &str,
        subject: &str,
        body: &str,
        attachment: Option<&Attachment>,
    ) -> anyhow::Result<()>;
}

/// Transport that writes deliveries to the log.
///
/// The default when no webhook is configured; useful for local development
/// and as a stand-in until a real delivery channel is wired up.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogTransport;

#[async_trait]
impl NotificationTransport for LogTransport {
    async fn deliver(
        &self,
        recipient: &str,
        subject: &str,
        body: &str,
        attachment: Option<&Attachment>,
    ) -> anyhow::Result<()> {
        info!(
            recipient = %recipient,
            subject = %subject,
            attachment = attachment.map(|a| a.filename.as_str()).unwrap_or("none"),
            body = %body,
            "Notification delivered to log"
        );
        Ok(())
    }
}

#[derive(Serialize)]
struct WebhookPayload<'a> {
    recipient: &'a str,
    subject: &'a str,
    body: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    attachment: Option<WebhookAttachment<'a>>,
}

#[derive(Serialize)]
struct WebhookAttachment<'a> {
    filename: &'a str,
    content_type: &'a str,
    size_bytes: usize,
}

/// Transport that POSTs each delivery to a configured webhook URL.
pub struct WebhookTransport {
    client: reqwest::Client,
    url: String,
}

impl WebhookTransport {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
        }
    }
}

#[async_trait]
impl NotificationTransport for WebhookTransport {
    async fn deliver(
        &self,
        recipient: &str,
        subject: &str,
        body: &str,
        attachment: Option<&Attachment>,
    ) -> anyhow::Result<()> {
        let payload = WebhookPayload {
            recipient,
            subject,
            body,
            attachment: attachment.map(|a| WebhookAttachment {
                filename: &a.filename,
                content_type: &a.content_type,
                size_bytes: a.content.len(),
            }),
        };

        let response = self.client.post(&self.url).json(&payload).send().await?;
        if !response.status().is_success() {
            anyhow::bail!("webhook returned status {}", response.status());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json_string, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_webhook_delivers_json_payload() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/notify"))
            .and(body_json_string(
                r#"{"recipient":"ops@example.com","subject":"File upload result","body":"ok"}"#,
            ))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let transport = WebhookTransport::new(format!("{}/notify", server.uri()));
        let result = transport
            .deliver("ops@example.com", "File upload result", "ok", None)
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_webhook_error_status_is_a_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let transport = WebhookTransport::new(server.uri());
        let result = transport.deliver("ops@example.com", "s", "b", None).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_log_transport_never_fails() {
        let transport = LogTransport;
        assert!(transport.deliver("a@b", "s", "b", None).await.is_ok());
    }
}
