//! DOCX text extraction
//!
//! Reads paragraph text from `word/document.xml`.

use super::ooxml::{xml_error, Package};
use super::{normalize_whitespace, LoadError, LoadedDocument};
use quick_xml::events::Event;
use quick_xml::reader::Reader;

const DOCUMENT_PART: &str = "word/document.xml";

/// Word document extractor
pub struct DocxLoader;

impl DocxLoader {
    /// Extract non-empty paragraphs, separated by blank lines
    pub fn load(bytes: &[u8]) -> Result<LoadedDocument, LoadError> {
        let mut package = Package::open(bytes)?;
        let xml = package.require_part(DOCUMENT_PART)?;

        let paragraphs: Vec<String> = Self::paragraphs(&xml)?
            .iter()
            .filter(|p| !p.trim().is_empty())
            .map(|p| normalize_whitespace(p))
            .collect();

        let text = paragraphs.join("\n\n");
        Ok(LoadedDocument::new(text).with_meta("paragraphs", paragraphs.len()))
    }

    /// Raw text of every top-level `w:p`, in document order.
    ///
    /// Paragraphs nested inside another (text boxes) become lines of the
    /// enclosing paragraph.
    fn paragraphs(xml: &str) -> Result<Vec<String>, LoadError> {
        let mut reader = Reader::from_str(xml);
        let mut paragraphs = Vec::new();
        let mut current = String::new();
        let mut depth = 0usize;
        let mut in_text = false;

        loop {
            match reader.read_event().map_err(xml_error)? {
                Event::Start(e) => match e.local_name().as_ref() {
                    b"p" => {
                        depth += 1;
                        if depth == 1 {
                            current.clear();
                        } else {
                            current.push('\n');
                        }
                    }
                    b"t" => in_text = true,
                    _ => {}
                },
                Event::End(e) => match e.local_name().as_ref() {
                    b"p" => {
                        if depth <= 1 {
                            paragraphs.push(std::mem::take(&mut current));
                        } else {
                            current.push('\n');
                        }
                        depth = depth.saturating_sub(1);
                    }
                    b"t" => in_text = false,
                    _ => {}
                },
                Event::Empty(e) => match e.local_name().as_ref() {
                    b"tab" => current.push('\t'),
                    b"br" | b"cr" => current.push('\n'),
                    _ => {}
                },
                Event::Text(t) if in_text => {
                    current.push_str(&t.unescape().map_err(xml_error)?);
                }
                Event::Eof => break,
                _ => {}
            }
        }

        Ok(paragraphs)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;
    use zip::{CompressionMethod, ZipWriter};

    /// Build an in-memory zip package from (name, content) parts
    pub(crate) fn build_package(parts: &[(&str, &str)]) -> Vec<u8> {
        let mut writer = ZipWriter::new(std::io::Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
        for (name, content) in parts {
            writer.start_file(*name, options).unwrap();
            writer.write_all(content.as_bytes()).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    const DOCUMENT_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:body>
    <w:p><w:r><w:t>Quarterly   report.</w:t></w:r></w:p>
    <w:p><w:r><w:t xml:space="preserve">Revenue </w:t></w:r><w:r><w:t>grew &amp; costs fell.</w:t></w:r></w:p>
    <w:p></w:p>
    <w:p><w:r><w:t>   </w:t></w:r></w:p>
    <w:p><w:r><w:t>Name</w:t><w:tab/><w:t>Value</w:t></w:r></w:p>
  </w:body>
</w:document>"#;

    #[test]
    fn test_extracts_paragraphs() {
        let bytes = build_package(&[(DOCUMENT_PART, DOCUMENT_XML)]);
        let doc = DocxLoader::load(&bytes).unwrap();

        assert_eq!(
            doc.text,
            "Quarterly report.\n\nRevenue grew & costs fell.\n\nName Value"
        );
        assert_eq!(doc.meta["paragraphs"], 3);
        assert!(doc.pages.is_none());
    }

    #[test]
    fn test_text_box_paragraph_stays_in_outer_paragraph() {
        let xml = r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:body>
    <w:p>
      <w:r><w:t>Before the box.</w:t></w:r>
      <w:r><w:pict><w:txbxContent>
        <w:p><w:r><w:t>Boxed text.</w:t></w:r></w:p>
      </w:txbxContent></w:pict></w:r>
      <w:r><w:t>After the box.</w:t></w:r>
    </w:p>
    <w:p><w:r><w:t>Next paragraph.</w:t></w:r></w:p>
  </w:body>
</w:document>"#;
        let bytes = build_package(&[(DOCUMENT_PART, xml)]);
        let doc = DocxLoader::load(&bytes).unwrap();

        assert_eq!(
            doc.text,
            "Before the box.\nBoxed text.\nAfter the box.\n\nNext paragraph."
        );
        assert_eq!(doc.meta["paragraphs"], 2);
    }

    #[test]
    fn test_missing_document_part() {
        let bytes = build_package(&[("word/styles.xml", "<styles/>")]);
        let err = DocxLoader::load(&bytes).unwrap_err();
        assert!(matches!(err, LoadError::Malformed(_)));
    }

    #[test]
    fn test_not_a_zip() {
        let err = DocxLoader::load(b"plain text, not a package").unwrap_err();
        assert!(matches!(err, LoadError::Archive(_)));
    }
}
