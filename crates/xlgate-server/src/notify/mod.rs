//! Notification dispatch
//!
//! Formats nothing itself: the dispatcher takes an already-rendered report
//! body and delivers it once per recipient through the configured transport.
//! Per-recipient failures are logged and recorded in the aggregated outcome
//! list, never propagated; a failed send for one recipient does not prevent
//! the remaining sends.

pub mod transport;

pub use transport::{Attachment, LogTransport, NotificationTransport, WebhookTransport};

use std::sync::Arc;
use tracing::{debug, warn};

/// Result of one best-effort delivery attempt.
#[derive(Debug, Clone)]
pub struct DispatchOutcome {
    pub recipient: String,
    pub delivered: bool,
    pub error: Option<String>,
}

/// Sends a report to a set of recipients, best-effort
pub struct NotificationDispatcher {
    transport: Arc<dyn NotificationTransport>,
}

impl NotificationDispatcher {
    pub fn new(transport: Arc<dyn NotificationTransport>) -> Self {
        Self { transport }
    }

    /// Deliver `body` to every recipient, one attempt each.
    #[tracing::instrument(skip(self, body, attachment), fields(recipients = recipients.len()))]
    pub async fn dispatch(
        &self,
        recipients: &[String],
        subject: &str,
        body: &str,
        attachment: Option<&Attachment>,
    ) -> Vec<DispatchOutcome> {
        let mut outcomes = Vec::with_capacity(recipients.len());

        for recipient in recipients {
            match self
                .transport
                .deliver(recipient, subject, body, attachment)
                .await
            {
                Ok(()) => {
                    debug!(recipient = %recipient, "notification delivered");
                    outcomes.push(DispatchOutcome {
                        recipient: recipient.clone(),
                        delivered: true,
                        error: None,
                    });
                },
                Err(err) => {
                    warn!(recipient = %recipient, error = %err, "notification delivery failed");
                    outcomes.push(DispatchOutcome {
                        recipient: recipient.clone(),
                        delivered: false,
                        error: Some(err.to_string()),
                    });
                },
            }
        }

        outcomes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Transport double that fails for one specific recipient.
    struct FlakyTransport {
        failing_recipient: String,
        deliveries: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl NotificationTransport for FlakyTransport {
        async fn deliver(
            &self,
            recipient: &str,
            _subject: &str,
            _body: &str,
            _attachment: Option<&Attachment>,
        ) -> anyhow::Result<()> {
            self.deliveries.lock().unwrap().push(recipient.to_string());
            if recipient == self.failing_recipient {
                anyhow::bail!("mailbox unavailable");
            }
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_one_failure_does_not_stop_remaining_sends() {
        let transport = Arc::new(FlakyTransport {
            failing_recipient: "second@example.com".to_string(),
            deliveries: Mutex::new(Vec::new()),
        });
        let dispatcher = NotificationDispatcher::new(
            Arc::clone(&transport) as Arc<dyn NotificationTransport>
        );

        let recipients = vec![
            "first@example.com".to_string(),
            "second@example.com".to_string(),
            "third@example.com".to_string(),
        ];
        let outcomes = dispatcher
            .dispatch(&recipients, "File upload result", "body", None)
            .await;

        assert_eq!(outcomes.len(), 3);
        assert!(outcomes[0].delivered);
        assert!(!outcomes[1].delivered);
        assert!(outcomes[1].error.as_deref().unwrap().contains("mailbox unavailable"));
        assert!(outcomes[2].delivered);

        // Every recipient got exactly one attempt, in order.
        assert_eq!(*transport.deliveries.lock().unwrap(), recipients);
    }

    #[tokio::test]
    async fn test_empty_recipient_list_is_a_noop() {
        let dispatcher = NotificationDispatcher::new(Arc::new(LogTransport));
        let outcomes = dispatcher.dispatch(&[], "s", "b", None).await;
        assert!(outcomes.is_empty());
    }
}
