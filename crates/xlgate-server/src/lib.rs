//! Xlgate Server Library
//!
//! HTTP service that ingests user-submitted spreadsheet files, validates
//! their structure, and routes each upload into one of two asynchronous
//! outcomes.
//!
//! # Architecture
//!
//! - **validate**: fail-fast chain of named checks producing an ordered
//!   collector of coded diagnostics; empty collector means valid
//! - **pipeline**: two-stage fire-and-forget task chain (transform then
//!   notify) connected by a oneshot handoff; scheduled only for valid files
//!   and never awaited by the caller
//! - **notify**: best-effort per-recipient report dispatch behind a
//!   pluggable transport (log or webhook)
//! - **orchestrator**: drives validation, branches into the pipeline or a
//!   synchronous failure notice, and returns a summary to the caller
//! - **api**: thin axum multipart intake over the orchestrator
//! - **workbook**: spreadsheet parsing behind a trait, shipped with an
//!   OOXML implementation
//!
//! The validation outcome is the only thing the caller ever sees
//! synchronously; pipeline results are reported out-of-band through the
//! notification layer.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use xlgate_server::config::Config;
//! use xlgate_server::file::UploadedFile;
//! use xlgate_server::notify::{LogTransport, NotificationDispatcher};
//! use xlgate_server::orchestrator::IngestionOrchestrator;
//! use xlgate_server::pipeline::{NoopTransform, TaskChain};
//! use xlgate_server::validate::ValidationChain;
//! use xlgate_server::workbook::OoxmlWorkbookParser;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load()?;
//!     let dispatcher = Arc::new(NotificationDispatcher::new(Arc::new(LogTransport)));
//!     let orchestrator = IngestionOrchestrator::new(
//!         ValidationChain::new(&config.ingest, Arc::new(OoxmlWorkbookParser::new())),
//!         TaskChain::new(
//!             Arc::new(NoopTransform),
//!             Arc::clone(&dispatcher),
//!             config.notify.subject.clone(),
//!         ),
//!         dispatcher,
//!         config.notify.clone(),
//!     );
//!     let file = UploadedFile::new("report.xls", "application/vnd.ms-excel", vec![]);
//!     let summary = orchestrator.ingest(&file, "user@example.com").await;
//!     println!("ok={} errors={}", summary.ok, summary.error_count);
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod config;
pub mod error;
pub mod file;
pub mod middleware;
pub mod notify;
pub mod orchestrator;
pub mod pipeline;
pub mod validate;
pub mod workbook;

// Re-export commonly used types
pub use error::{AppError, AppResult};
pub use orchestrator::{IngestionOrchestrator, Outcome, Summary};
