//! Report body formatting
//!
//! One composite human-readable body per notification: message descriptions
//! rendered one per line, in the order they were collected.

use xlgate_common::{DiagnosticMessage, MessageCollector};

use super::PipelineResult;

fn render_lines(messages: &[DiagnosticMessage]) -> String {
    let mut lines = String::new();
    for message in messages {
        lines.push_str(&message.description);
        lines.push('\n');
    }
    lines
}

/// Body for the success path: errors first, then successes, original order.
pub fn pipeline_report(initiator: &str, result: &PipelineResult) -> String {
    format!(
        "User {} uploaded file. Results:\n{}{}",
        initiator,
        render_lines(&result.errors),
        render_lines(&result.successes),
    )
}

/// Body for the validation-failure path.
pub fn validation_report(initiator: &str, collector: &MessageCollector) -> String {
    format!(
        "User {} uploaded file. File did not pass validation, validation errors:\n{}",
        initiator,
        render_lines(collector.messages()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipeline_report_orders_errors_before_successes() {
        let mut result = PipelineResult::new();
        result.successes.push(DiagnosticMessage::success(200, "42 rows processed"));
        result.errors.push(DiagnosticMessage::error(400, "row 3 rejected"));
        result.errors.push(DiagnosticMessage::error(400, "row 7 rejected"));

        let body = pipeline_report("user@example.com", &result);
        assert!(body.starts_with("User user@example.com uploaded file. Results:\n"));

        let row3 = body.find("row 3 rejected").unwrap();
        let row7 = body.find("row 7 rejected").unwrap();
        let processed = body.find("42 rows processed").unwrap();
        assert!(row3 < row7);
        assert!(row7 < processed);
    }

    #[test]
    fn test_validation_report_lists_descriptions_in_order() {
        let mut collector = MessageCollector::new();
        collector.append_error(500, "Error reading file: short read");

        let body = validation_report("user@example.com", &collector);
        assert!(body.contains("File did not pass validation"));
        assert!(body.ends_with("Error reading file: short read\n"));
    }
}
