//! Chunking and tokenizer configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// What to do with buffered sentences when a sentence too large for any chunk arrives
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OversizedPolicy {
    /// Discard the buffer without emitting it (historical behaviour, loses text)
    #[default]
    DropBuffer,
    /// Emit the buffer as its own chunk before hard-splitting
    FlushBuffer,
}

/// Chunking configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkingConfig {
    /// Soft token ceiling per chunk
    #[serde(default = "default_max_tokens")]
    pub max_tokens: usize,
    /// Minimum tokens of trailing context carried into the next chunk
    #[serde(default = "default_overlap")]
    pub overlap: usize,
    /// Below this running total the buffer keeps absorbing sentences
    #[serde(default = "default_min_sent_tokens")]
    pub min_sent_tokens: usize,
    /// Buffer handling before an oversized sentence
    #[serde(default)]
    pub oversized: OversizedPolicy,
}

fn default_max_tokens() -> usize {
    400
}

fn default_overlap() -> usize {
    50
}

fn default_min_sent_tokens() -> usize {
    5
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            max_tokens: default_max_tokens(),
            overlap: default_overlap(),
            min_sent_tokens: default_min_sent_tokens(),
            oversized: OversizedPolicy::default(),
        }
    }
}

/// Tokenizer selection
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenizerConfig {
    /// Path to a HuggingFace `tokenizer.json`; the length/4 heuristic is used
    /// when unset or unloadable
    #[serde(default)]
    pub tokenizer_path: Option<PathBuf>,
}
