//! Lightweight sentence segmentation
//!
//! Splits after a CJK or Latin sentence terminator followed by whitespace, and on
//! paragraph breaks. No abbreviation or decimal handling.

use regex::Regex;
use std::sync::OnceLock;

static RE_BOUNDARY: OnceLock<Regex> = OnceLock::new();

/// Sentence terminators that stay attached to the preceding sentence
const TERMINATORS: [char; 6] = ['。', '！', '？', '.', '!', '?'];

fn boundary() -> &'static Regex {
    RE_BOUNDARY.get_or_init(|| Regex::new(r"[。！？.!?]\s+|\n{2,}").unwrap())
}

/// Split text into trimmed, non-empty sentence-like pieces, in order
pub fn segment(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut start = 0;

    for m in boundary().find_iter(text) {
        // A terminator belongs to the sentence it ends; only the whitespace is a separator
        let end = match m.as_str().chars().next() {
            Some(c) if TERMINATORS.contains(&c) => m.start() + c.len_utf8(),
            _ => m.start(),
        };
        push_trimmed(&mut sentences, &text[start..end]);
        start = m.end();
    }
    push_trimmed(&mut sentences, &text[start..]);

    sentences
}

fn push_trimmed(out: &mut Vec<String>, piece: &str) {
    let trimmed = piece.trim();
    if !trimmed.is_empty() {
        out.push(trimmed.to_string());
    }
}
