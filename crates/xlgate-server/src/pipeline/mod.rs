//! Two-stage asynchronous processing pipeline
//!
//! Invoked only for uploads that passed validation. Stage A (transform) runs
//! the domain-specific processing over the parsed workbook and produces a
//! [`PipelineResult`]; Stage B (notify) formats the composite report and
//! dispatches it to every recipient. The result is handed from A to B through
//! a oneshot channel, so B never starts before A has fully completed, and the
//! chain runs on spawned tasks that the caller does not await.
//!
//! Failure containment: an error (or panic) inside Stage A is converted into
//! a 400-coded error entry so the notification still goes out; per-recipient
//! dispatch failures inside Stage B are absorbed by the dispatcher.

pub mod report;

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use async_trait::async_trait;
use futures::FutureExt;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};
use xlgate_common::DiagnosticMessage;

use crate::notify::{Attachment, DispatchOutcome, NotificationDispatcher};
use crate::workbook::Workbook;

/// Outcome of the transform stage, handed to the notify stage.
///
/// Ownership moves stage to stage; neither retains it after handing it on.
#[derive(Debug, Clone, Default)]
pub struct PipelineResult {
    pub errors: Vec<DiagnosticMessage>,
    pub successes: Vec<DiagnosticMessage>,
}

impl PipelineResult {
    pub fn new() -> Self {
        Self::default()
    }

    fn from_error(message: DiagnosticMessage) -> Self {
        Self {
            errors: vec![message],
            successes: Vec::new(),
        }
    }
}

/// Stage A: domain-specific processing over the validated workbook.
///
/// Extension point: the core does not specify what the file means. A normal
/// completion should carry at least one 200-coded success entry; any returned
/// error is caught by the chain and surfaced as a 400-coded error entry.
#[async_trait]
pub trait TransformStage: Send + Sync {
    async fn run(&self, workbook: Workbook) -> anyhow::Result<PipelineResult>;
}

/// Default transform: records that the workbook was processed.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopTransform;

#[async_trait]
impl TransformStage for NoopTransform {
    async fn run(&self, workbook: Workbook) -> anyhow::Result<PipelineResult> {
        let mut result = PipelineResult::new();
        let rows: usize = workbook.sheets.iter().map(|s| s.rows.len()).sum();
        result.successes.push(DiagnosticMessage::success(
            200,
            format!(
                "File processed: {} sheet(s), {} row(s)",
                workbook.sheet_count(),
                rows
            ),
        ));
        Ok(result)
    }
}

/// Everything Stage B needs besides the transform result.
struct NotifyContext {
    initiator: String,
    recipients: Vec<String>,
    subject: String,
    attachment: Option<Attachment>,
}

/// Two-stage fire-and-forget pipeline
pub struct TaskChain {
    transform: Arc<dyn TransformStage>,
    dispatcher: Arc<NotificationDispatcher>,
    subject: String,
}

impl TaskChain {
    pub fn new(
        transform: Arc<dyn TransformStage>,
        dispatcher: Arc<NotificationDispatcher>,
        subject: impl Into<String>,
    ) -> Self {
        Self {
            transform,
            dispatcher,
            subject: subject.into(),
        }
    }

    /// Schedule the chain and return immediately.
    ///
    /// The returned handle resolves with Stage B's per-recipient outcomes;
    /// the caller is free to drop it, and the orchestrator does. Each stage
    /// runs at most once, and Stage B strictly follows Stage A.
    pub fn schedule(
        &self,
        workbook: Workbook,
        initiator: String,
        recipients: Vec<String>,
        attachment: Option<Attachment>,
    ) -> JoinHandle<Vec<DispatchOutcome>> {
        let (result_tx, result_rx) = oneshot::channel::<PipelineResult>();

        // Stage A: transform. Failures and panics both collapse into an
        // error entry so the notification still goes out.
        let transform = Arc::clone(&self.transform);
        tokio::spawn(async move {
            let outcome = AssertUnwindSafe(transform.run(workbook)).catch_unwind().await;
            let result = match outcome {
                Ok(Ok(result)) => result,
                Ok(Err(err)) => {
                    warn!(error = %err, "transform stage failed");
                    PipelineResult::from_error(DiagnosticMessage::error(400, err.to_string()))
                },
                Err(_) => {
                    error!("transform stage panicked");
                    PipelineResult::from_error(DiagnosticMessage::error(
                        400,
                        "transform stage panicked",
                    ))
                },
            };
            if result_tx.send(result).is_err() {
                warn!("notify stage hung up before the transform result was handed over");
            }
        });

        // Stage B: notify. Starts only once Stage A's result arrives.
        let dispatcher = Arc::clone(&self.dispatcher);
        let context = NotifyContext {
            initiator,
            recipients,
            subject: self.subject.clone(),
            attachment,
        };
        tokio::spawn(async move {
            let Ok(result) = result_rx.await else {
                // Only reachable when the transform task was torn down
                // mid-flight (runtime shutdown).
                error!("transform stage dropped without producing a result");
                return Vec::new();
            };

            let body = report::pipeline_report(&context.initiator, &result);
            let outcomes = dispatcher
                .dispatch(
                    &context.recipients,
                    &context.subject,
                    &body,
                    context.attachment.as_ref(),
                )
                .await;
            info!(
                delivered = outcomes.iter().filter(|o| o.delivered).count(),
                failed = outcomes.iter().filter(|o| !o.delivered).count(),
                "pipeline report dispatched"
            );
            outcomes
        })
    }
}
