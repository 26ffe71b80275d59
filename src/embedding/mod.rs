//! Embedding client
//!
//! Sends chunk text to an external embedding service. See [`backend`] for the
//! supported providers and configuration.

pub mod backend;

pub use backend::{
    create_backend, EmbeddingBackend, EmbeddingError, EmbeddingResult, RetryPolicy,
};
