//! Pluggable embedding backend system
//!
//! - **Ollama backend**: native `/api/embeddings`, one request per text
//! - **OpenAI backend**: OpenAI-compatible APIs (OpenAI, Azure, LM Studio, vLLM, TEI)
//!
//! Every request goes through a bounded exponential backoff (see [`retry`]).
//!
//! # Example Configuration
//!
//! ```toml
//! # Local Ollama
//! [embedding]
//! backend = "ollama"
//! url = "http://localhost:11434"
//! model = "nomic-embed-text"
//!
//! # OpenAI
//! [embedding]
//! backend = "openai"
//! endpoint = "https://api.openai.com/v1/embeddings"
//! model = "text-embedding-3-small"
//! # api_key from OPENAI_API_KEY env var
//! ```

mod factory;
mod http;
mod ollama;
mod openai;
pub mod retry;
mod traits;

pub use factory::create_backend;
pub use ollama::OllamaBackend;
pub use openai::{OpenAiBackend, OpenAiConfig};
pub use retry::RetryPolicy;
pub use traits::{EmbeddingBackend, EmbeddingError, EmbeddingResult, DIMENSION_PROBE};
