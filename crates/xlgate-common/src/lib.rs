//! Xlgate Common Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Shared types, utilities, and error handling for the xlgate project.
//!
//! # Overview
//!
//! This crate provides common functionality used across all xlgate workspace
//! members:
//!
//! - **Error Handling**: Custom error types and result types
//! - **Diagnostics**: Coded diagnostic messages and the append-only collector
//!   shared by the validation chain and the processing pipeline
//! - **Logging**: Centralized tracing setup
//!
//! # Example
//!
//! ```
//! use xlgate_common::messages::MessageCollector;
//!
//! let mut collector = MessageCollector::new();
//! collector.append_error(400, "File over the size limit 20971520 bytes");
//! assert!(!collector.is_empty());
//! ```

pub mod error;
pub mod logging;
pub mod messages;

// Re-export commonly used types
pub use error::{Result, XlgateError};
pub use messages::{DiagnosticMessage, MessageCollector, MessageKind};
