//! OOXML workbook parser
//!
//! Reads the spreadsheet as a zip container and extracts sheet names and cell
//! values from the XML parts (`xl/workbook.xml`, `xl/worksheets/sheetN.xml`,
//! `xl/sharedStrings.xml`). This covers what the core needs: sheet counts for
//! the structural check and row values for the transform stage.

use quick_xml::escape::resolve_predefined_entity;
use quick_xml::events::{BytesRef, Event};
use quick_xml::Reader;
use std::io::{Cursor, Read, Seek};
use zip::result::ZipError;
use zip::ZipArchive;

use super::{Sheet, Workbook, WorkbookError, WorkbookParser};

/// Parser for OOXML (`.xlsx`-style) workbooks
#[derive(Debug, Clone, Copy, Default)]
pub struct OoxmlWorkbookParser;

impl OoxmlWorkbookParser {
    pub fn new() -> Self {
        Self
    }
}

impl WorkbookParser for OoxmlWorkbookParser {
    fn parse(&self, bytes: &[u8]) -> Result<Workbook, WorkbookError> {
        let mut archive = ZipArchive::new(Cursor::new(bytes))
            .map_err(|e| WorkbookError::Archive(e.to_string()))?;

        let workbook_xml = read_part(&mut archive, "xl/workbook.xml")?
            .ok_or_else(|| WorkbookError::MissingPart("xl/workbook.xml".to_string()))?;
        let names = sheet_names(&workbook_xml)?;

        let shared = match read_part(&mut archive, "xl/sharedStrings.xml")? {
            Some(xml) => shared_strings(&xml)?,
            None => Vec::new(),
        };

        let mut sheets = Vec::with_capacity(names.len());
        for (index, name) in names.into_iter().enumerate() {
            // Worksheet parts are conventionally numbered in sheet order.
            let part = format!("xl/worksheets/sheet{}.xml", index + 1);
            let rows = match read_part(&mut archive, &part)? {
                Some(xml) => sheet_rows(&xml, &shared)?,
                None => Vec::new(),
            };
            sheets.push(Sheet { name, rows });
        }

        Ok(Workbook { sheets })
    }
}

fn read_part<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    name: &str,
) -> Result<Option<String>, WorkbookError> {
    match archive.by_name(name) {
        Ok(mut part) => {
            let mut xml = String::new();
            part.read_to_string(&mut xml)
                .map_err(|e| WorkbookError::Archive(e.to_string()))?;
            Ok(Some(xml))
        },
        Err(ZipError::FileNotFound) => Ok(None),
        Err(e) => Err(WorkbookError::Archive(e.to_string())),
    }
}

/// Resolve one `&name;` or `&#N;` reference to its character data.
///
/// The reader hands references over as their own events; only the XML
/// predefined entities and character references are meaningful here.
fn resolve_reference(reference: &BytesRef) -> Result<String, WorkbookError> {
    if let Some(ch) = reference
        .resolve_char_ref()
        .map_err(|e| WorkbookError::Xml(e.to_string()))?
    {
        return Ok(ch.to_string());
    }
    let name = reference
        .decode()
        .map_err(|e| WorkbookError::Xml(e.to_string()))?;
    resolve_predefined_entity(&name)
        .map(str::to_string)
        .ok_or_else(|| WorkbookError::Xml(format!("unresolved entity reference: {name}")))
}

/// Extract sheet names, in declaration order, from `xl/workbook.xml`.
fn sheet_names(xml: &str) -> Result<Vec<String>, WorkbookError> {
    let mut reader = Reader::from_str(xml);

    let mut names = Vec::new();
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) | Ok(Event::Empty(e))
                if e.local_name().as_ref() == b"sheet" =>
            {
                for attr in e.attributes().flatten() {
                    if attr.key.local_name().as_ref() == b"name" {
                        let value = attr
                            .unescape_value()
                            .map_err(|e| WorkbookError::Xml(e.to_string()))?;
                        names.push(value.into_owned());
                    }
                }
            },
            Ok(Event::Eof) => break,
            Ok(_) => {},
            Err(e) => return Err(WorkbookError::Xml(e.to_string())),
        }
    }
    Ok(names)
}

/// Extract the shared-string table from `xl/sharedStrings.xml`.
fn shared_strings(xml: &str) -> Result<Vec<String>, WorkbookError> {
    let mut reader = Reader::from_str(xml);

    let mut strings = Vec::new();
    let mut current: Option<String> = None;
    let mut in_text = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"si" => current = Some(String::new()),
                b"t" => in_text = true,
                _ => {},
            },
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"si" => {
                    if let Some(s) = current.take() {
                        strings.push(s);
                    }
                },
                b"t" => in_text = false,
                _ => {},
            },
            Ok(Event::Text(e)) if in_text => {
                let text = e.decode().map_err(|e| WorkbookError::Xml(e.to_string()))?;
                if let Some(ref mut s) = current {
                    s.push_str(&text);
                }
            },
            Ok(Event::GeneralRef(e)) if in_text => {
                if let Some(ref mut s) = current {
                    s.push_str(&resolve_reference(&e)?);
                }
            },
            Ok(Event::Eof) => break,
            Ok(_) => {},
            Err(e) => return Err(WorkbookError::Xml(e.to_string())),
        }
    }
    Ok(strings)
}

/// Extract row values from one worksheet part, resolving shared strings.
fn sheet_rows(xml: &str, shared: &[String]) -> Result<Vec<Vec<String>>, WorkbookError> {
    let mut reader = Reader::from_str(xml);

    let mut rows: Vec<Vec<String>> = Vec::new();
    let mut current_row: Option<Vec<String>> = None;
    let mut cell_is_shared = false;
    // Accumulated text of the open `<v>` or inline `<t>` element.
    let mut pending: Option<String> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"row" => current_row = Some(Vec::new()),
                b"c" => {
                    cell_is_shared = e.attributes().flatten().any(|attr| {
                        attr.key.local_name().as_ref() == b"t" && attr.value.as_ref() == b"s"
                    });
                },
                b"v" | b"t" => pending = Some(String::new()),
                _ => {},
            },
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"row" => {
                    if let Some(row) = current_row.take() {
                        rows.push(row);
                    }
                },
                b"v" => {
                    if let Some(text) = pending.take() {
                        let value = if cell_is_shared {
                            text.trim()
                                .parse::<usize>()
                                .ok()
                                .and_then(|i| shared.get(i).cloned())
                                .unwrap_or(text)
                        } else {
                            text
                        };
                        if let Some(ref mut row) = current_row {
                            row.push(value);
                        }
                    }
                },
                b"t" => {
                    if let Some(text) = pending.take() {
                        if let Some(ref mut row) = current_row {
                            row.push(text);
                        }
                    }
                },
                _ => {},
            },
            Ok(Event::Text(e)) => {
                if let Some(ref mut text) = pending {
                    let decoded =
                        e.decode().map_err(|e| WorkbookError::Xml(e.to_string()))?;
                    text.push_str(&decoded);
                }
            },
            Ok(Event::GeneralRef(e)) => {
                if let Some(ref mut text) = pending {
                    text.push_str(&resolve_reference(&e)?);
                }
            },
            Ok(Event::Eof) => break,
            Ok(_) => {},
            Err(e) => return Err(WorkbookError::Xml(e.to_string())),
        }
    }
    Ok(rows)
}
