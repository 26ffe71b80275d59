//! Token-budgeted packing of sentences into overlapping chunks

use super::segmenter::segment;
use super::tokenizer::{HeuristicTokenizer, TokenCounter};
use crate::config::{ChunkingConfig, OversizedPolicy};
use tracing::debug;

/// Packs sentences into chunks of at most `max_tokens`, carrying an overlap tail
/// of whole sentences from each chunk into the next.
pub struct ChunkPacker<'a> {
    counter: &'a dyn TokenCounter,
    config: ChunkingConfig,
}

impl<'a> ChunkPacker<'a> {
    pub fn new(counter: &'a dyn TokenCounter, config: ChunkingConfig) -> Self {
        Self { counter, config }
    }

    /// Split `text` into ordered, trimmed, non-empty chunks
    pub fn pack(&self, text: &str) -> Vec<String> {
        let max_tokens = self.config.max_tokens;
        let mut chunks = Vec::new();
        let mut buffer = SentenceBuffer::default();

        for sentence in segment(text) {
            let tokens = self.counter.count_tokens(&sentence);

            if tokens >= max_tokens {
                self.release_before_oversized(&mut buffer, &mut chunks);
                chunks.extend(hard_split(&sentence, self.hard_split_width()));
                continue;
            }

            if buffer.tokens + tokens <= max_tokens || buffer.tokens < self.config.min_sent_tokens {
                buffer.push(sentence, tokens);
            } else {
                chunks.push(buffer.join());
                buffer = buffer.overlap_tail(self.config.overlap);
                buffer.push(sentence, tokens);
            }
        }

        if !buffer.is_empty() {
            chunks.push(buffer.join());
        }

        chunks
            .into_iter()
            .filter_map(|chunk| {
                let trimmed = chunk.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            })
            .collect()
    }

    /// What happens to buffered sentences when an oversized sentence arrives
    fn release_before_oversized(&self, buffer: &mut SentenceBuffer, chunks: &mut Vec<String>) {
        if buffer.is_empty() {
            return;
        }
        match self.config.oversized {
            OversizedPolicy::DropBuffer => {
                debug!(
                    "Dropping {} buffered sentences ({} tokens) before oversized sentence",
                    buffer.sentences.len(),
                    buffer.tokens
                );
            }
            OversizedPolicy::FlushBuffer => chunks.push(buffer.join()),
        }
        buffer.clear();
    }

    fn hard_split_width(&self) -> usize {
        HeuristicTokenizer::estimate_chars(self.config.max_tokens).max(1)
    }
}

/// Split text into chunks with the given counter and configuration.
///
/// Equivalent to `ChunkPacker::new(counter, config.clone()).pack(text)`.
pub fn chunk_text(text: &str, counter: &dyn TokenCounter, config: &ChunkingConfig) -> Vec<String> {
    ChunkPacker::new(counter, config.clone()).pack(text)
}

/// Consecutive substrings of at most `width` characters
fn hard_split(sentence: &str, width: usize) -> Vec<String> {
    let chars: Vec<char> = sentence.chars().collect();
    chars.chunks(width).map(|piece| piece.iter().collect()).collect()
}

/// Sentences waiting to be emitted, with their cached token counts
#[derive(Debug, Default)]
struct SentenceBuffer {
    sentences: Vec<(String, usize)>,
    tokens: usize,
}

impl SentenceBuffer {
    fn push(&mut self, sentence: String, tokens: usize) {
        self.sentences.push((sentence, tokens));
        self.tokens += tokens;
    }

    fn is_empty(&self) -> bool {
        self.sentences.is_empty()
    }

    fn clear(&mut self) {
        self.sentences.clear();
        self.tokens = 0;
    }

    fn join(&self) -> String {
        self.sentences
            .iter()
            .map(|(s, _)| s.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Trailing whole sentences whose token sum first reaches `overlap`, or the
    /// whole buffer if it never does
    fn overlap_tail(self, overlap: usize) -> SentenceBuffer {
        let mut tail = SentenceBuffer::default();
        if overlap == 0 {
            return tail;
        }

        let mut kept = Vec::new();
        let mut accumulated = 0;
        for entry in self.sentences.into_iter().rev() {
            accumulated += entry.1;
            kept.push(entry);
            if accumulated >= overlap {
                break;
            }
        }

        for (sentence, tokens) in kept.into_iter().rev() {
            tail.push(sentence, tokens);
        }
        tail
    }
}
