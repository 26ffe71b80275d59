//! Content extraction module
//!
//! Turns PDF, DOCX, Markdown, spreadsheet and plain-text files into normalized
//! text plus metadata. The loader is picked from the file extension; anything
//! unrecognized is read as plain text.

mod docx;
mod markdown;
mod ooxml;
mod pdf;
mod spreadsheet;
mod text;

pub use docx::DocxLoader;
pub use markdown::MarkdownLoader;
pub use pdf::PdfLoader;
pub use spreadsheet::SpreadsheetLoader;
pub use text::TextLoader;

use crate::types::{MetaMap, Page};
use regex::Regex;
use std::fmt;
use std::path::Path;
use std::sync::OnceLock;
use tracing::debug;

static RE_HSPACE: OnceLock<Regex> = OnceLock::new();
static RE_SPACE_BEFORE_NEWLINE: OnceLock<Regex> = OnceLock::new();

/// Errors raised while loading a document
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("PDF extraction failed: {0}")]
    Pdf(String),

    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("XML error: {0}")]
    Xml(String),

    #[error("Unsupported document: {0}")]
    Unsupported(String),

    #[error("Malformed document: {0}")]
    Malformed(String),
}

/// Text and metadata extracted from one file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadedDocument {
    /// Normalized full text
    pub text: String,
    /// Per-page text, for formats that have pages
    pub pages: Option<Vec<Page>>,
    /// Format-specific metadata
    pub meta: MetaMap,
    /// Document title (if detected)
    pub title: Option<String>,
}

impl LoadedDocument {
    pub fn new(text: String) -> Self {
        Self {
            text,
            ..Self::default()
        }
    }

    pub fn with_pages(mut self, pages: Vec<Page>) -> Self {
        self.pages = Some(pages);
        self
    }

    pub fn with_meta(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.meta.insert(key.into(), value.into());
        self
    }

    pub fn with_title(mut self, title: Option<String>) -> Self {
        self.title = title;
        self
    }
}

/// Supported loaders
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoaderKind {
    Pdf,
    Docx,
    Markdown,
    Spreadsheet,
    PlainText,
}

impl LoaderKind {
    /// Pick a loader from the file extension (case-insensitive)
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());

        match ext.as_deref() {
            Some("pdf") => Self::Pdf,
            Some("docx") => Self::Docx,
            Some("md" | "markdown") => Self::Markdown,
            Some("xlsx" | "xls") => Self::Spreadsheet,
            _ => Self::PlainText,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Docx => "docx",
            Self::Markdown => "markdown",
            Self::Spreadsheet => "spreadsheet",
            Self::PlainText => "text",
        }
    }

    /// Read and extract a file with this loader
    pub fn load(&self, path: &Path) -> Result<LoadedDocument, LoadError> {
        let bytes = std::fs::read(path)?;
        debug!(
            "Loading {} ({} bytes) with {} loader",
            path.display(),
            bytes.len(),
            self.name()
        );

        if *self == Self::Spreadsheet && SpreadsheetLoader::is_legacy_xls(path) {
            return Err(LoadError::Unsupported(format!(
                "legacy binary spreadsheet {}; save it as .xlsx",
                path.display()
            )));
        }

        self.load_bytes(&bytes)
    }

    /// Extract already-read file contents with this loader
    pub fn load_bytes(&self, bytes: &[u8]) -> Result<LoadedDocument, LoadError> {
        match self {
            Self::Pdf => PdfLoader::load(bytes),
            Self::Docx => DocxLoader::load(bytes),
            Self::Markdown => Ok(MarkdownLoader::load(bytes)),
            Self::Spreadsheet => SpreadsheetLoader::load(bytes),
            Self::PlainText => Ok(TextLoader::load(bytes)),
        }
    }
}

impl fmt::Display for LoaderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Load a file with the loader matching its extension
pub fn load_path(path: &Path) -> Result<LoadedDocument, LoadError> {
    LoaderKind::from_path(path).load(path)
}

/// Collapse runs of spaces/tabs, drop horizontal whitespace before line breaks,
/// and trim.
///
/// Only horizontal whitespace is removed before a newline; a `\s+\n` collapse
/// would also fold blank lines away. Blank lines stay here, and the segmenter
/// splits paragraphs on them.
pub fn normalize_whitespace(text: &str) -> String {
    let hspace = RE_HSPACE.get_or_init(|| Regex::new(r"[ \t]+").unwrap());
    let before_newline = RE_SPACE_BEFORE_NEWLINE.get_or_init(|| Regex::new(r" \n").unwrap());

    let unified = text.replace("\r\n", "\n").replace('\r', "\n");
    let collapsed = hspace.replace_all(&unified, " ");
    before_newline.replace_all(&collapsed, "\n").trim().to_string()
}

/// Decode UTF-8, dropping byte sequences that are not valid UTF-8
pub fn decode_utf8_ignoring_errors(bytes: &[u8]) -> String {
    bytes.utf8_chunks().map(|chunk| chunk.valid()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_loader_from_extension() {
        let cases = [
            ("report.pdf", LoaderKind::Pdf),
            ("REPORT.PDF", LoaderKind::Pdf),
            ("letter.docx", LoaderKind::Docx),
            ("notes.md", LoaderKind::Markdown),
            ("notes.markdown", LoaderKind::Markdown),
            ("budget.xlsx", LoaderKind::Spreadsheet),
            ("old.xls", LoaderKind::Spreadsheet),
            ("readme.txt", LoaderKind::PlainText),
            ("data.csv", LoaderKind::PlainText),
            ("Makefile", LoaderKind::PlainText),
            ("legacy.doc", LoaderKind::PlainText),
        ];
        for (name, expected) in cases {
            assert_eq!(LoaderKind::from_path(&PathBuf::from(name)), expected, "{}", name);
        }
    }

    #[test]
    fn test_normalize_whitespace() {
        assert_eq!(normalize_whitespace("  a \t\t b  "), "a b");
        assert_eq!(normalize_whitespace("line one   \nline two"), "line one\nline two");
        assert_eq!(normalize_whitespace("para one\n\npara two"), "para one\n\npara two");
        assert_eq!(normalize_whitespace("para one\n \t \npara two"), "para one\n\npara two");
        assert_eq!(normalize_whitespace("windows\r\nline"), "windows\nline");
    }

    #[test]
    fn test_normalize_keeps_blank_lines() {
        assert_eq!(normalize_whitespace("a \n\n\nb"), "a\n\n\nb");
        assert_eq!(normalize_whitespace("a\r\n\r\nb"), "a\n\nb");
    }

    #[test]
    fn test_decode_drops_invalid_bytes() {
        let bytes = b"caf\xc3\xa9 \xff\xfebar";
        assert_eq!(decode_utf8_ignoring_errors(bytes), "café bar");
    }

    #[test]
    fn test_load_path_plain_text_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.log");
        std::fs::write(&path, b"First line.   Second line.\xff").unwrap();

        let doc = load_path(&path).unwrap();
        assert_eq!(doc.text, "First line. Second line.");
        assert!(doc.pages.is_none());
        assert!(doc.meta.is_empty());
    }

    #[test]
    fn test_load_path_missing_file() {
        let err = load_path(Path::new("/nonexistent/file.txt")).unwrap_err();
        assert!(matches!(err, LoadError::Io(_)));
    }

    #[test]
    fn test_legacy_xls_is_unsupported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("old.xls");
        std::fs::write(&path, b"\xd0\xcf\x11\xe0").unwrap();

        let err = load_path(&path).unwrap_err();
        assert!(matches!(err, LoadError::Unsupported(_)));
    }
}
