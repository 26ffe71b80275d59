//! Embedding backend trait definitions
//!
//! Defines the core trait that all embedding backends must implement.

use crate::types::Embedding;
use std::fmt::Debug;

/// Fixed input used to discover a backend's output dimension
pub const DIMENSION_PROBE: &str = "dimension probe";

/// Errors that can occur during embedding operations
#[derive(Debug, thiserror::Error)]
pub enum EmbeddingError {
    /// Network or transport failure
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Server answered with a non-success status
    #[error("HTTP error ({status}): {body}")]
    HttpStatus { status: u16, body: String },

    /// Rate limited by the API
    #[error("Rate limited, retry after {retry_after_ms:?}ms")]
    RateLimited {
        /// Suggested retry delay in milliseconds, if provided by the API
        retry_after_ms: Option<u64>,
    },

    /// Response body could not be decoded
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// The request worker died before producing a result
    #[error("Internal error: {0}")]
    Internal(String),

    /// Every attempt failed with a transient error
    #[error("Giving up after {attempts} attempts: {last}")]
    RetriesExhausted {
        attempts: u32,
        #[source]
        last: Box<EmbeddingError>,
    },
}

impl EmbeddingError {
    /// Whether another attempt may succeed
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Network(_) | Self::HttpStatus { .. } | Self::RateLimited { .. }
        )
    }
}

/// Result type for embedding operations
pub type EmbeddingResult<T> = Result<T, EmbeddingError>;

/// Core trait for embedding backends
///
/// The trait is object-safe for use with `dyn EmbeddingBackend`.
pub trait EmbeddingBackend: Send + Sync + Debug {
    /// Generate the embedding for a single text
    fn embed_one(&self, text: &str) -> EmbeddingResult<Embedding>;

    /// Generate embeddings for a batch of texts, in input order
    ///
    /// The default implementation calls `embed_one` for each text.
    fn embed_batch(&self, texts: &[String]) -> EmbeddingResult<Vec<Embedding>> {
        texts.iter().map(|t| self.embed_one(t)).collect()
    }

    /// Output dimension, discovered by embedding a fixed probe text
    fn embedding_dim(&self) -> EmbeddingResult<usize> {
        self.embed_one(DIMENSION_PROBE).map(|v| v.len())
    }

    /// Get the backend name (e.g., "ollama", "openai")
    fn name(&self) -> &str;
}
