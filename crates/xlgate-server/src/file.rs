//! Uploaded file intake types
//!
//! The core never performs network I/O itself; the intake boundary hands it
//! one [`FileSource`] per ingestion. Validators and pipeline stages receive
//! the file by reference and treat it as read-only.

use bytes::Bytes;
use std::io;

/// Read-only view of one uploaded file.
///
/// `read` yields the complete buffer from offset zero on every call, so a
/// consumer can never observe a partially-consumed file left behind by an
/// earlier stage.
pub trait FileSource: Send + Sync {
    /// Original filename as submitted by the uploader.
    fn name(&self) -> &str;

    /// Declared media type of the upload.
    fn content_type(&self) -> &str;

    /// Declared size of the upload in bytes.
    fn size_bytes(&self) -> u64;

    /// Full byte content of the upload.
    fn read(&self) -> io::Result<Bytes>;

    /// Filename extension after the last dot, exactly as submitted.
    ///
    /// No case folding: the extension check matches byte-for-byte, so
    /// `Report.XLS` is not an `xls` file.
    fn extension(&self) -> Option<String> {
        self.name()
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_string())
    }
}

/// In-memory upload handed over by the HTTP intake.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    name: String,
    content_type: String,
    size_bytes: u64,
    content: Bytes,
}

impl UploadedFile {
    pub fn new(
        name: impl Into<String>,
        content_type: impl Into<String>,
        content: impl Into<Bytes>,
    ) -> Self {
        let content = content.into();
        Self {
            name: name.into(),
            content_type: content_type.into(),
            size_bytes: content.len() as u64,
            content,
        }
    }
}

impl FileSource for UploadedFile {
    fn name(&self) -> &str {
        &self.name
    }

    fn content_type(&self) -> &str {
        &self.content_type
    }

    fn size_bytes(&self) -> u64 {
        self.size_bytes
    }

    fn read(&self) -> io::Result<Bytes> {
        // Bytes clones are reference-counted views over one immutable buffer.
        Ok(self.content.clone())
    }
}
