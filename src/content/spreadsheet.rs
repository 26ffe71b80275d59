//! XLSX workbook extraction
//!
//! Sheets are rendered in workbook order as a `# Sheet: {name}` heading followed by
//! one line per row.

use super::ooxml::{attribute, xml_error, Package};
use super::{normalize_whitespace, LoadError, LoadedDocument};
use quick_xml::events::Event;
use quick_xml::reader::Reader;
use std::collections::HashMap;
use std::path::Path;

const WORKBOOK_PART: &str = "xl/workbook.xml";
const WORKBOOK_RELS_PART: &str = "xl/_rels/workbook.xml.rels";
const SHARED_STRINGS_PART: &str = "xl/sharedStrings.xml";

/// A sheet entry from the workbook, before its part is resolved
struct SheetRef {
    name: String,
    rel_id: String,
}

/// Spreadsheet extractor
pub struct SpreadsheetLoader;

impl SpreadsheetLoader {
    /// Whether the path names a legacy binary workbook
    pub fn is_legacy_xls(path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("xls"))
    }

    /// Extract every sheet of an `.xlsx` workbook
    pub fn load(bytes: &[u8]) -> Result<LoadedDocument, LoadError> {
        let mut package = Package::open(bytes)?;

        let sheets = parse_workbook(&package.require_part(WORKBOOK_PART)?)?;
        let targets = parse_relationships(&package.require_part(WORKBOOK_RELS_PART)?)?;
        let shared = match package.read_part(SHARED_STRINGS_PART)? {
            Some(xml) => parse_shared_strings(&xml)?,
            None => Vec::new(),
        };

        let mut rendered = Vec::with_capacity(sheets.len());
        let mut names = Vec::with_capacity(sheets.len());
        for sheet in sheets {
            let target = targets.get(&sheet.rel_id).ok_or_else(|| {
                LoadError::Malformed(format!("sheet '{}' has no relationship", sheet.name))
            })?;
            let xml = package.require_part(&resolve_target(target))?;
            let rows = parse_rows(&xml, &shared)?;

            let mut block = format!("# Sheet: {}\n", sheet.name);
            block.push_str(&rows.join("\n"));
            rendered.push(block);
            names.push(serde_json::Value::String(sheet.name));
        }

        let text = normalize_whitespace(&rendered.join("\n\n"));
        Ok(LoadedDocument::new(text).with_meta("sheets", names))
    }
}

/// Part path for a relationship target, relative to `xl/` unless absolute
fn resolve_target(target: &str) -> String {
    match target.strip_prefix('/') {
        Some(absolute) => absolute.to_string(),
        None => format!("xl/{}", target),
    }
}

fn parse_workbook(xml: &str) -> Result<Vec<SheetRef>, LoadError> {
    let mut reader = Reader::from_str(xml);
    let mut sheets = Vec::new();

    loop {
        match reader.read_event().map_err(xml_error)? {
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"sheet" => {
                let name = attribute(&e, b"name")?.unwrap_or_default();
                let rel_id = attribute(&e, b"id")?
                    .ok_or_else(|| LoadError::Malformed(format!("sheet '{}' has no r:id", name)))?;
                sheets.push(SheetRef { name, rel_id });
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(sheets)
}

fn parse_relationships(xml: &str) -> Result<HashMap<String, String>, LoadError> {
    let mut reader = Reader::from_str(xml);
    let mut targets = HashMap::new();

    loop {
        match reader.read_event().map_err(xml_error)? {
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"Relationship" => {
                if let (Some(id), Some(target)) = (attribute(&e, b"Id")?, attribute(&e, b"Target")?) {
                    targets.insert(id, target);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(targets)
}

/// Shared string table; rich-text runs inside one `si` are concatenated
fn parse_shared_strings(xml: &str) -> Result<Vec<String>, LoadError> {
    let mut reader = Reader::from_str(xml);
    let mut strings = Vec::new();
    let mut current = String::new();
    let mut in_text = false;

    loop {
        match reader.read_event().map_err(xml_error)? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"si" => current.clear(),
                b"t" => in_text = true,
                _ => {}
            },
            Event::End(e) => match e.local_name().as_ref() {
                b"si" => strings.push(std::mem::take(&mut current)),
                b"t" => in_text = false,
                _ => {}
            },
            Event::Empty(e) if e.local_name().as_ref() == b"si" => strings.push(String::new()),
            Event::Text(t) if in_text => current.push_str(&t.unescape().map_err(xml_error)?),
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(strings)
}

/// Rows of one worksheet, non-empty cells joined by a single space
fn parse_rows(xml: &str, shared: &[String]) -> Result<Vec<String>, LoadError> {
    let mut reader = Reader::from_str(xml);
    let mut rows = Vec::new();
    let mut row: Vec<String> = Vec::new();
    let mut cell_type: Option<String> = None;
    let mut value = String::new();
    let mut in_value = false;

    loop {
        match reader.read_event().map_err(xml_error)? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"row" => row.clear(),
                b"c" => {
                    cell_type = attribute(&e, b"t")?;
                    value.clear();
                }
                b"v" | b"t" => in_value = true,
                _ => {}
            },
            Event::End(e) => match e.local_name().as_ref() {
                b"row" => {
                    if !row.is_empty() {
                        rows.push(row.join(" "));
                    }
                }
                b"c" => {
                    let text = cell_text(cell_type.as_deref(), &value, shared)?;
                    if !text.trim().is_empty() {
                        row.push(text.trim().to_string());
                    }
                }
                b"v" | b"t" => in_value = false,
                _ => {}
            },
            Event::Text(t) if in_value => value.push_str(&t.unescape().map_err(xml_error)?),
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(rows)
}

fn cell_text(cell_type: Option<&str>, raw: &str, shared: &[String]) -> Result<String, LoadError> {
    match cell_type {
        Some("s") => {
            let index: usize = raw
                .trim()
                .parse()
                .map_err(|_| LoadError::Malformed(format!("invalid shared string index '{}'", raw)))?;
            shared
                .get(index)
                .cloned()
                .ok_or_else(|| LoadError::Malformed(format!("shared string {} out of range", index)))
        }
        Some("b") => Ok(match raw.trim() {
            "1" => "TRUE".to_string(),
            "0" => "FALSE".to_string(),
            other => other.to_string(),
        }),
        _ => Ok(raw.to_string()),
    }
}
