//! Diagnostic messages and the message collector
//!
//! A [`DiagnosticMessage`] is one coded, human-readable note describing a
//! validation or processing outcome. Messages carry conventional status-like
//! codes (400 for client-side defects, 500 for corruption, 200 for success)
//! but no numeric range is enforced beyond non-negativity.
//!
//! A [`MessageCollector`] owns an ordered, append-only sequence of messages.
//! Insertion order is significant: it is the order checks ran and the order
//! shown in reports. Each validation or pipeline run owns its own collector,
//! so no cross-run sharing occurs.

use serde::{Deserialize, Serialize};

/// Semantic tag distinguishing the two message subtypes.
///
/// Error and success messages share the same structure; only the tag differs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    Error,
    Success,
}

/// One coded diagnostic note. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosticMessage {
    pub code: u16,
    pub kind: MessageKind,
    pub description: String,
}

impl DiagnosticMessage {
    /// Create an error-tagged message.
    pub fn error(code: u16, description: impl Into<String>) -> Self {
        Self {
            code,
            kind: MessageKind::Error,
            description: description.into(),
        }
    }

    /// Create a success-tagged message.
    pub fn success(code: u16, description: impl Into<String>) -> Self {
        Self {
            code,
            kind: MessageKind::Success,
            description: description.into(),
        }
    }
}

/// Append-only, ordered sequence of diagnostic messages.
///
/// Diagnostics accumulate monotonically within one run: there is no removal,
/// reordering, or deduplication. An empty collector means "valid".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageCollector {
    messages: Vec<DiagnosticMessage>,
}

impl MessageCollector {
    /// Create an empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one message to the end of the sequence.
    pub fn append(&mut self, message: DiagnosticMessage) {
        self.messages.push(message);
    }

    /// Append an error-tagged message.
    pub fn append_error(&mut self, code: u16, description: impl Into<String>) {
        self.append(DiagnosticMessage::error(code, description));
    }

    /// Append a success-tagged message.
    pub fn append_success(&mut self, code: u16, description: impl Into<String>) {
        self.append(DiagnosticMessage::success(code, description));
    }

    /// Whether any message has been appended.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Number of appended messages.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Read-only view of the full ordered sequence.
    pub fn messages(&self) -> &[DiagnosticMessage] {
        &self.messages
    }

    /// Iterate over the messages in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, DiagnosticMessage> {
        self.messages.iter()
    }
}

impl<'a> IntoIterator for &'a MessageCollector {
    type Item = &'a DiagnosticMessage;
    type IntoIter = std::slice::Iter<'a, DiagnosticMessage>;

    fn into_iter(self) -> Self::IntoIter {
        self.messages.iter()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_new_collector_is_empty() {
        let collector = MessageCollector::new();
        assert!(collector.is_empty());
        assert_eq!(collector.len(), 0);
        assert!(collector.messages().is_empty());
    }

    #[test]
    fn test_append_preserves_insertion_order() {
        let mut collector = MessageCollector::new();
        collector.append_error(500, "Error reading file: disk gone");
        collector.append_error(400, "File over the size limit 1024 bytes");
        collector.append_success(200, "processed");

        let codes: Vec<u16> = collector.iter().map(|m| m.code).collect();
        assert_eq!(codes, vec![500, 400, 200]);
        assert!(!collector.is_empty());
        assert_eq!(collector.len(), 3);
    }

    #[test]
    fn test_duplicates_are_kept() {
        let mut collector = MessageCollector::new();
        collector.append_error(400, "same");
        collector.append_error(400, "same");
        assert_eq!(collector.len(), 2);
        assert_eq!(collector.messages()[0], collector.messages()[1]);
    }

    #[test]
    fn test_message_kinds() {
        let error = DiagnosticMessage::error(400, "bad");
        let success = DiagnosticMessage::success(200, "good");
        assert_eq!(error.kind, MessageKind::Error);
        assert_eq!(success.kind, MessageKind::Success);
        assert_eq!(error.code, 400);
        assert_eq!(success.description, "good");
    }

    #[test]
    fn test_serde_round_trip() {
        let mut collector = MessageCollector::new();
        collector.append_error(400, "Unexpected file extension: expected 'xls'");

        let json = serde_json::to_string(&collector).unwrap();
        let back: MessageCollector = serde_json::from_str(&json).unwrap();
        assert_eq!(back, collector);
    }
}
