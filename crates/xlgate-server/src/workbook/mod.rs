//! Workbook parsing
//!
//! The validation chain and the transform stage consume spreadsheets through
//! the [`WorkbookParser`] trait; the parser itself is an external capability.
//! Any parse failure is converted at the boundary into a corrupted-file
//! diagnostic, never propagated out of the core.

pub mod ooxml;

pub use ooxml::OoxmlWorkbookParser;

use thiserror::Error;

/// Errors that can occur while parsing a workbook
#[derive(Debug, Error)]
pub enum WorkbookError {
    #[error("invalid workbook archive: {0}")]
    Archive(String),

    #[error("invalid workbook XML: {0}")]
    Xml(String),

    #[error("workbook is missing part: {0}")]
    MissingPart(String),
}

/// Parsed, in-memory view of one spreadsheet
#[derive(Debug, Clone, Default)]
pub struct Workbook {
    pub sheets: Vec<Sheet>,
}

impl Workbook {
    pub fn sheet_count(&self) -> usize {
        self.sheets.len()
    }
}

/// One worksheet: a name and its rows of cell values
#[derive(Debug, Clone)]
pub struct Sheet {
    pub name: String,
    pub rows: Vec<Vec<String>>,
}

/// Parser boundary for spreadsheet bytes
pub trait WorkbookParser: Send + Sync {
    fn parse(&self, bytes: &[u8]) -> Result<Workbook, WorkbookError>;
}
