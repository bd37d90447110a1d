//! Upload validation chain
//!
//! Decides deterministically whether an uploaded file is acceptable. Every
//! failure mode is represented as an appended diagnostic, never as a raised
//! error: the chain itself cannot fail, it can only return a result.
//!
//! The checks run in a fixed, documented order (read, size, extension, sheet
//! count, pluggable content checks) and the chain is fail-fast: after the
//! read step, each check runs only while the collector is still empty, so the
//! first appended message short-circuits everything later. The order is part
//! of the observable behavior and is preserved as documented rather than
//! re-derived.

use std::sync::Arc;

use tracing::debug;
use xlgate_common::MessageCollector;

use crate::config::IngestConfig;
use crate::file::FileSource;
use crate::workbook::{Workbook, WorkbookParser};

/// Domain-specific content check over the parsed workbook.
///
/// Extension point for row/column shape and required-cell rules; the core
/// ships none. Checks run after the structural check, in registration order,
/// under the same fail-fast rule.
pub trait ContentCheck: Send + Sync {
    fn name(&self) -> &'static str;

    fn check(&self, workbook: &Workbook, collector: &mut MessageCollector);
}

/// Result of one validation run.
///
/// Carries the parsed workbook alongside the collector so a valid run's
/// caller does not have to parse the same bytes twice.
pub struct ValidationRun {
    pub collector: MessageCollector,
    /// Present only when the run produced no diagnostics.
    pub workbook: Option<Workbook>,
}

/// Fail-fast sequence of named checks over file metadata and content
pub struct ValidationChain {
    max_file_size_bytes: u64,
    accepted_extension: String,
    parser: Arc<dyn WorkbookParser>,
    checks: Vec<Box<dyn ContentCheck>>,
}

impl ValidationChain {
    pub fn new(config: &IngestConfig, parser: Arc<dyn WorkbookParser>) -> Self {
        Self {
            max_file_size_bytes: config.max_file_size_bytes,
            accepted_extension: config.accepted_extension.clone(),
            parser,
            checks: Vec::new(),
        }
    }

    /// Register a domain-specific content check.
    pub fn with_check(mut self, check: Box<dyn ContentCheck>) -> Self {
        self.checks.push(check);
        self
    }

    /// Validate one uploaded file. Empty collector ⇔ valid.
    pub fn validate(&self, file: &dyn FileSource) -> MessageCollector {
        self.run(file).collector
    }

    /// Validate and hand back the parsed workbook for the valid case.
    pub fn run(&self, file: &dyn FileSource) -> ValidationRun {
        let mut collector = MessageCollector::new();

        let content = match file.read() {
            Ok(bytes) => Some(bytes),
            Err(err) => {
                collector.append_error(500, format!("Error reading file: {err}"));
                None
            },
        };

        if collector.is_empty() {
            self.check_file_size(file, &mut collector);
        }

        if collector.is_empty() {
            self.check_file_extension(file, &mut collector);
        }

        let workbook = if collector.is_empty() {
            // The read step already reported a failure if content is absent,
            // so the collector being empty implies the bytes are here.
            content
                .as_deref()
                .and_then(|bytes| self.check_sheet_count(bytes, &mut collector))
        } else {
            None
        };

        if let Some(ref workbook) = workbook {
            for check in &self.checks {
                if !collector.is_empty() {
                    break;
                }
                debug!(check = check.name(), "running content check");
                check.check(workbook, &mut collector);
            }
        }

        let workbook = if collector.is_empty() { workbook } else { None };
        ValidationRun {
            collector,
            workbook,
        }
    }

    fn check_file_size(&self, file: &dyn FileSource, collector: &mut MessageCollector) {
        if file.size_bytes() > self.max_file_size_bytes {
            collector.append_error(
                400,
                format!("File over the size limit {} bytes", self.max_file_size_bytes),
            );
        }
    }

    fn check_file_extension(&self, file: &dyn FileSource, collector: &mut MessageCollector) {
        let matches = file
            .extension()
            .is_some_and(|ext| ext == self.accepted_extension);
        if !matches {
            collector.append_error(
                400,
                format!(
                    "Unexpected file extension: expected '{}'",
                    self.accepted_extension
                ),
            );
        }
    }

    fn check_sheet_count(
        &self,
        bytes: &[u8],
        collector: &mut MessageCollector,
    ) -> Option<Workbook> {
        match self.parser.parse(bytes) {
            Ok(workbook) => {
                if workbook.sheet_count() > 1 {
                    collector.append_error(
                        400,
                        format!(
                            "Workbook has {} sheets, multiple sheets are not supported",
                            workbook.sheet_count()
                        ),
                    );
                }
                Some(workbook)
            },
            Err(err) => {
                collector.append_error(500, format!("Error reading file: {err}"));
                None
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file::UploadedFile;
    use crate::workbook::{Sheet, WorkbookError};
    use bytes::Bytes;
    use std::io;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Parser double returning a fixed sheet count.
    struct StubParser {
        sheet_count: usize,
        fail: bool,
        calls: AtomicUsize,
    }

    impl StubParser {
        fn sheets(sheet_count: usize) -> Self {
            Self {
                sheet_count,
                fail: false,
                calls: AtomicUsize::new(0),
            }
        }

        fn failing() -> Self {
            Self {
                sheet_count: 0,
                fail: true,
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl WorkbookParser for StubParser {
        fn parse(&self, _bytes: &[u8]) -> Result<Workbook, WorkbookError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(WorkbookError::Archive("truncated archive".to_string()));
            }
            let sheets = (0..self.sheet_count)
                .map(|i| Sheet {
                    name: format!("Sheet{}", i + 1),
                    rows: Vec::new(),
                })
                .collect();
            Ok(Workbook { sheets })
        }
    }

    /// File double whose read always fails.
    struct CorruptFile;

    impl FileSource for CorruptFile {
        fn name(&self) -> &str {
            "report.xls"
        }

        fn content_type(&self) -> &str {
            "application/vnd.ms-excel"
        }

        fn size_bytes(&self) -> u64 {
            1024
        }

        fn read(&self) -> io::Result<Bytes> {
            Err(io::Error::new(io::ErrorKind::UnexpectedEof, "stream went away"))
        }
    }

    fn chain(parser: StubParser) -> ValidationChain {
        ValidationChain::new(&IngestConfig {
            max_file_size_bytes: 20 * 1024 * 1024,
            accepted_extension: "xls".to_string(),
        }, Arc::new(parser))
    }

    fn file(name: &str, size: usize) -> UploadedFile {
        UploadedFile::new(name, "application/vnd.ms-excel", vec![0u8; size])
    }

    #[test]
    fn test_valid_file_yields_empty_collector() {
        let chain = chain(StubParser::sheets(1));
        let collector = chain.validate(&file("report.xls", 1024));
        assert!(collector.is_empty());
    }

    #[test]
    fn test_valid_run_hands_back_workbook() {
        let chain = chain(StubParser::sheets(1));
        let run = chain.run(&file("report.xls", 1024));
        assert!(run.collector.is_empty());
        assert_eq!(run.workbook.map(|w| w.sheet_count()), Some(1));
    }

    #[test]
    fn test_oversized_file() {
        // Scenario: 25 MiB upload, matching extension, one sheet.
        let chain = chain(StubParser::sheets(1));
        let collector = chain.validate(&file("report.xls", 25 * 1024 * 1024));

        assert_eq!(collector.len(), 1);
        let message = &collector.messages()[0];
        assert_eq!(message.code, 400);
        assert!(message.description.contains("size limit"));
        assert!(message.description.contains(&(20 * 1024 * 1024).to_string()));
    }

    #[test]
    fn test_oversized_file_skips_parsing() {
        let parser = StubParser::sheets(1);
        let chain = ValidationChain::new(
            &IngestConfig {
                max_file_size_bytes: 1024,
                accepted_extension: "xls".to_string(),
            },
            Arc::new(parser),
        );
        let run = chain.run(&file("report.xls", 4096));
        assert_eq!(run.collector.len(), 1);
        assert!(run.workbook.is_none());
    }

    #[test]
    fn test_unexpected_extension() {
        // Scenario: 1 KiB upload named *.csv, one sheet.
        let chain = chain(StubParser::sheets(1));
        let collector = chain.validate(&file("report.csv", 1024));

        assert_eq!(collector.len(), 1);
        let message = &collector.messages()[0];
        assert_eq!(message.code, 400);
        assert!(message.description.contains("Unexpected file extension"));
        assert!(message.description.contains("xls"));
    }

    #[test]
    fn test_uppercase_extension_rejected() {
        // Extension matching is case-sensitive: XLS is not xls.
        let chain = chain(StubParser::sheets(1));
        let collector = chain.validate(&file("Report.XLS", 1024));

        assert_eq!(collector.len(), 1);
        let message = &collector.messages()[0];
        assert_eq!(message.code, 400);
        assert!(message.description.contains("Unexpected file extension"));
    }

    #[test]
    fn test_missing_extension_rejected() {
        let chain = chain(StubParser::sheets(1));
        let collector = chain.validate(&file("report", 1024));
        assert_eq!(collector.len(), 1);
        assert_eq!(collector.messages()[0].code, 400);
    }

    #[test]
    fn test_multiple_sheets() {
        // Scenario: 1 KiB upload, matching extension, three sheets.
        let chain = chain(StubParser::sheets(3));
        let collector = chain.validate(&file("report.xls", 1024));

        assert_eq!(collector.len(), 1);
        let message = &collector.messages()[0];
        assert_eq!(message.code, 400);
        assert!(message.description.contains("multiple sheets"));
    }

    #[test]
    fn test_unreadable_file_stops_the_chain() {
        // Scenario: metadata is fine but the byte read fails.
        let chain = chain(StubParser::sheets(1));
        let run = chain.run(&CorruptFile);

        assert_eq!(run.collector.len(), 1);
        let message = &run.collector.messages()[0];
        assert_eq!(message.code, 500);
        assert!(message.description.starts_with("Error reading file:"));
        assert!(run.workbook.is_none());
    }

    #[test]
    fn test_corrupted_archive_reported_as_500() {
        let chain = chain(StubParser::failing());
        let collector = chain.validate(&file("report.xls", 1024));

        assert_eq!(collector.len(), 1);
        let message = &collector.messages()[0];
        assert_eq!(message.code, 500);
        assert!(message.description.contains("Error reading file:"));
    }

    #[test]
    fn test_fail_fast_reports_only_the_first_defect() {
        // Oversized AND wrong extension: only the size message may appear,
        // and the parser must never run.
        let parser = Arc::new(StubParser::sheets(3));
        let chain = ValidationChain::new(
            &IngestConfig {
                max_file_size_bytes: 1024,
                accepted_extension: "xls".to_string(),
            },
            Arc::clone(&parser) as Arc<dyn WorkbookParser>,
        );
        let collector = chain.validate(&file("report.csv", 4096));

        assert_eq!(collector.len(), 1);
        assert!(collector.messages()[0].description.contains("size limit"));
        assert_eq!(parser.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_validate_is_idempotent() {
        let chain = chain(StubParser::sheets(3));
        let upload = file("report.xls", 1024);

        let first = chain.validate(&upload);
        let second = chain.validate(&upload);
        assert_eq!(first, second);
    }

    #[test]
    fn test_content_checks_run_in_order_and_fail_fast() {
        struct FailingCheck;
        impl ContentCheck for FailingCheck {
            fn name(&self) -> &'static str {
                "required-header"
            }
            fn check(&self, _workbook: &Workbook, collector: &mut MessageCollector) {
                collector.append_error(400, "Missing header row");
            }
        }

        struct PanickyCheck;
        impl ContentCheck for PanickyCheck {
            fn name(&self) -> &'static str {
                "never-reached"
            }
            fn check(&self, _workbook: &Workbook, _collector: &mut MessageCollector) {
                panic!("a later check ran after a defect was already known");
            }
        }

        let chain = chain(StubParser::sheets(1))
            .with_check(Box::new(FailingCheck))
            .with_check(Box::new(PanickyCheck));
        let run = chain.run(&file("report.xls", 1024));

        assert_eq!(run.collector.len(), 1);
        assert_eq!(run.collector.messages()[0].description, "Missing header row");
        assert!(run.workbook.is_none());
    }
}
