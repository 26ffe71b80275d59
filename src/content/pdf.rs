//! PDF text extraction
//!
//! Extracts text page by page with pdf-extract; pages are joined with a blank
//! line so sentences never run across a page boundary.

use super::{normalize_whitespace, LoadError, LoadedDocument};
use crate::types::Page;

/// PDF content extractor
pub struct PdfLoader;

impl PdfLoader {
    /// Extract per-page text from PDF bytes
    pub fn load(bytes: &[u8]) -> Result<LoadedDocument, LoadError> {
        let raw_pages = pdf_extract::extract_text_from_mem_by_pages(bytes)
            .map_err(|e| LoadError::Pdf(e.to_string()))?;
        Ok(Self::from_pages(&raw_pages))
    }

    /// Build the document from raw per-page text
    fn from_pages(raw_pages: &[String]) -> LoadedDocument {
        let pages = collect_pages(raw_pages);
        let text = pages
            .iter()
            .map(|p| p.text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");
        let title = guess_title(&text);

        LoadedDocument::new(text)
            .with_pages(pages)
            .with_meta("page_count", raw_pages.len())
            .with_title(title)
    }
}

/// Pages empty after normalization are skipped but keep their place in the
/// numbering.
fn collect_pages(raw_pages: &[String]) -> Vec<Page> {
    raw_pages
        .iter()
        .enumerate()
        .filter_map(|(i, page)| {
            let text = normalize_whitespace(page);
            (!text.is_empty()).then(|| Page {
                page_number: i + 1,
                text,
            })
        })
        .collect()
}

/// First substantial line among the opening few, skipping page numbers and URLs
fn guess_title(text: &str) -> Option<String> {
    text.lines()
        .take(5)
        .map(str::trim)
        .find(|line| {
            (10..=200).contains(&line.len())
                && !line.starts_with("http")
                && !line.starts_with("www.")
                && !line.chars().all(|c| c.is_numeric() || c.is_whitespace())
        })
        .map(str::to_string)
}
