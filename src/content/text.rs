//! Plain text extraction

use super::{decode_utf8_ignoring_errors, normalize_whitespace, LoadedDocument};

/// Plain text extractor; also the fallback for unknown extensions
pub struct TextLoader;

impl TextLoader {
    pub fn load(bytes: &[u8]) -> LoadedDocument {
        LoadedDocument::new(normalize_whitespace(&decode_utf8_ignoring_errors(bytes)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lossy_decode_and_normalize() {
        let doc = TextLoader::load(b"  Hello\xc0   world.  \r\n\r\nNext paragraph.\t\n");
        assert_eq!(doc.text, "Hello world.\n\nNext paragraph.");
        assert!(doc.meta.is_empty());
        assert!(doc.title.is_none());
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(TextLoader::load(b"").text, "");
    }
}
