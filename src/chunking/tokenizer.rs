//! Token counting strategies
//!
//! The packer only relies on [`TokenCounter::count_tokens`]. Which strategy backs
//! it is decided once, when the [`TokenizerStrategy`] is built, and then passed
//! around by reference.

use crate::config::TokenizerConfig;
use std::fmt;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use tokenizers::Tokenizer;
use tracing::{debug, info, warn};

/// Characters per token assumed by the heuristic counter
pub const CHARS_PER_TOKEN: usize = 4;

/// Anything that can estimate the token length of a string.
///
/// Implementations must return at least 1 for every input.
pub trait TokenCounter: Send + Sync {
    fn count_tokens(&self, text: &str) -> usize;
}

/// `ceil(chars / 4)`, floored at 1
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicTokenizer;

impl HeuristicTokenizer {
    /// Estimate token count from character count
    pub fn estimate_tokens(char_count: usize) -> usize {
        char_count.div_ceil(CHARS_PER_TOKEN).max(1)
    }

    /// Estimate character count from token count
    pub fn estimate_chars(token_count: usize) -> usize {
        token_count * CHARS_PER_TOKEN
    }
}

impl TokenCounter for HeuristicTokenizer {
    fn count_tokens(&self, text: &str) -> usize {
        Self::estimate_tokens(text.chars().count())
    }
}

/// Subword token counts from a HuggingFace `tokenizer.json`
///
/// The first failed encode switches this counter to the heuristic for the rest
/// of its lifetime, so one document is never measured with mixed counts.
pub struct ExactTokenizer {
    tokenizer: Tokenizer,
    degraded: AtomicBool,
}

impl ExactTokenizer {
    /// Load a tokenizer definition from disk
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let tokenizer = Tokenizer::from_file(path).map_err(|e| {
            anyhow::anyhow!("Failed to load tokenizer '{}': {}", path.display(), e)
        })?;
        Ok(Self::from_tokenizer(tokenizer))
    }

    pub fn from_tokenizer(tokenizer: Tokenizer) -> Self {
        Self {
            tokenizer,
            degraded: AtomicBool::new(false),
        }
    }

    /// Whether an encode failure has switched this counter to the heuristic
    pub fn is_degraded(&self) -> bool {
        self.degraded.load(Ordering::Relaxed)
    }
}

impl TokenCounter for ExactTokenizer {
    fn count_tokens(&self, text: &str) -> usize {
        if self.is_degraded() {
            return HeuristicTokenizer.count_tokens(text);
        }
        match self.tokenizer.encode(text, false) {
            Ok(encoding) => encoding.get_ids().len().max(1),
            Err(e) => {
                if !self.degraded.swap(true, Ordering::Relaxed) {
                    warn!("Tokenizer failed to encode text, using length/4 heuristic from now on: {}", e);
                }
                HeuristicTokenizer.count_tokens(text)
            }
        }
    }
}

impl fmt::Debug for ExactTokenizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExactTokenizer")
            .field("tokenizer", &"<Tokenizer>")
            .field("degraded", &self.is_degraded())
            .finish()
    }
}

/// Token counting strategy, selected once at start-up
#[derive(Debug)]
pub enum TokenizerStrategy {
    Exact(ExactTokenizer),
    Heuristic(HeuristicTokenizer),
}

impl TokenizerStrategy {
    /// Pick the exact tokenizer when one is configured and loads, otherwise the
    /// heuristic. Load failures are not reported as errors.
    pub fn from_config(config: &TokenizerConfig) -> Self {
        let Some(path) = config.tokenizer_path.as_deref() else {
            debug!("No tokenizer configured, using length/4 heuristic");
            return Self::heuristic();
        };

        match ExactTokenizer::from_file(path) {
            Ok(exact) => {
                info!("Using exact tokenizer from {}", path.display());
                Self::Exact(exact)
            }
            Err(e) => {
                debug!("{}; falling back to length/4 heuristic", e);
                Self::heuristic()
            }
        }
    }

    pub fn heuristic() -> Self {
        Self::Heuristic(HeuristicTokenizer)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Exact(t) if t.is_degraded() => "heuristic",
            Self::Exact(_) => "exact",
            Self::Heuristic(_) => "heuristic",
        }
    }
}

impl Default for TokenizerStrategy {
    fn default() -> Self {
        Self::heuristic()
    }
}

impl TokenCounter for TokenizerStrategy {
    fn count_tokens(&self, text: &str) -> usize {
        match self {
            Self::Exact(t) => t.count_tokens(text),
            Self::Heuristic(t) => t.count_tokens(text),
        }
    }
}
