//! Ingestion orchestration
//!
//! One `ingest` call drives the validation chain and branches: a valid file
//! schedules the two-stage pipeline (fire-and-forget), an invalid file
//! dispatches the validation-failure report before returning. Either way the
//! caller gets a synchronous [`Summary`] that reflects the validation outcome
//! only; the pipeline's eventual outcome is reported out-of-band via the
//! notification it sends.
//!
//! Ingestions are mutually independent: the only state shared across
//! concurrent calls is the read-only configuration.

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::NotifyConfig;
use crate::file::FileSource;
use crate::notify::{Attachment, NotificationDispatcher};
use crate::pipeline::{report, TaskChain};
use crate::validate::ValidationChain;

/// Synchronous result of one ingestion, surfaced to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub ok: bool,
    pub error_count: usize,
}

/// Which of the two terminal branches an ingestion took.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Validation passed; the pipeline was scheduled.
    Scheduled,
    /// Validation failed; the failure report was dispatched.
    Notified,
}

/// Drives validation and branches into the pipeline or a failure notice
pub struct IngestionOrchestrator {
    validation: ValidationChain,
    tasks: TaskChain,
    dispatcher: Arc<NotificationDispatcher>,
    notify: NotifyConfig,
}

impl IngestionOrchestrator {
    pub fn new(
        validation: ValidationChain,
        tasks: TaskChain,
        dispatcher: Arc<NotificationDispatcher>,
        notify: NotifyConfig,
    ) -> Self {
        Self {
            validation,
            tasks,
            dispatcher,
            notify,
        }
    }

    /// Ingest one uploaded file on behalf of `initiator`.
    ///
    /// Always returns synchronously; never waits on the scheduled pipeline.
    #[tracing::instrument(
        skip(self, file),
        fields(
            ingestion_id = %Uuid::new_v4(),
            file = %file.name(),
            size_bytes = file.size_bytes(),
            initiator = %initiator,
        )
    )]
    pub async fn ingest(&self, file: &dyn FileSource, initiator: &str) -> Summary {
        let run = self.validation.run(file);
        let error_count = run.collector.len();
        let recipients = self.recipients_for(initiator);

        let outcome = if run.collector.is_empty() {
            // A valid run always carries the parsed workbook; the default
            // only guards the type-level gap.
            let workbook = run.workbook.unwrap_or_default();
            let attachment = Attachment::from_file(file).ok();
            let _pipeline = self.tasks.schedule(
                workbook,
                initiator.to_string(),
                recipients,
                attachment,
            );
            Outcome::Scheduled
        } else {
            let body = report::validation_report(initiator, &run.collector);
            let attachment = Attachment::from_file(file).ok();
            self.dispatcher
                .dispatch(
                    &recipients,
                    &self.notify.subject,
                    &body,
                    attachment.as_ref(),
                )
                .await;
            Outcome::Notified
        };

        match outcome {
            Outcome::Scheduled => {
                info!("File passed validation, background processing pipeline scheduled");
            },
            Outcome::Notified => {
                warn!(
                    error_count,
                    "Uploaded file raised validation errors, failure report dispatched"
                );
            },
        }

        Summary {
            ok: error_count == 0,
            error_count,
        }
    }

    /// Per-ingestion recipient set: the initiator followed by the configured
    /// default recipients.
    fn recipients_for(&self, initiator: &str) -> Vec<String> {
        std::iter::once(initiator.to_string())
            .chain(self.notify.recipients.iter().cloned())
            .collect()
    }
}
