//! Markdown extraction with YAML front matter

use super::{decode_utf8_ignoring_errors, normalize_whitespace, LoadedDocument};
use serde_json::{Map, Value};
use tracing::debug;

const DELIMITER: &str = "---";

/// Markdown extractor
pub struct MarkdownLoader;

impl MarkdownLoader {
    /// Split off front matter and normalize the body
    pub fn load(bytes: &[u8]) -> LoadedDocument {
        let source = decode_utf8_ignoring_errors(bytes);
        let (frontmatter, body) = split_front_matter(&source);

        let frontmatter = frontmatter.map(parse_front_matter).unwrap_or_default();
        let text = normalize_whitespace(body);

        let title = frontmatter
            .get("title")
            .and_then(Value::as_str)
            .map(str::to_string)
            .or_else(|| first_heading(&text));

        LoadedDocument::new(text)
            .with_meta("frontmatter", Value::Object(frontmatter))
            .with_title(title)
    }
}

/// Returns `(front matter block, body)`; the block must open on the very first line
fn split_front_matter(source: &str) -> (Option<&str>, &str) {
    let source = source.strip_prefix('\u{feff}').unwrap_or(source);

    let Some(rest) = source
        .strip_prefix(DELIMITER)
        .and_then(|r| r.strip_prefix("\r\n").or_else(|| r.strip_prefix('\n')))
    else {
        return (None, source);
    };

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == DELIMITER {
            let block = &rest[..offset];
            let body = &rest[offset + line.len()..];
            return (Some(block), body);
        }
        offset += line.len();
    }

    // Unterminated block: treat the whole file as body
    (None, source)
}

fn parse_front_matter(block: &str) -> Map<String, Value> {
    match serde_yaml::from_str::<Value>(block) {
        Ok(Value::Object(map)) => map,
        Ok(_) => Map::new(),
        Err(e) => {
            debug!("Ignoring unparsable front matter: {}", e);
            Map::new()
        }
    }
}

fn first_heading(text: &str) -> Option<String> {
    text.lines()
        .find_map(|line| line.strip_prefix("# "))
        .map(|heading| heading.trim().to_string())
        .filter(|heading| !heading.is_empty())
}
