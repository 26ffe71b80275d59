//! Embedding backend configuration

use serde::{Deserialize, Serialize};

/// Default timeout for embedding requests
fn default_timeout() -> u64 {
    60
}

/// Default batch size for OpenAI-compatible requests
fn default_batch_size() -> usize {
    100
}

fn default_ollama_url() -> String {
    "http://localhost:11434".to_string()
}

fn default_ollama_model() -> String {
    "nomic-embed-text".to_string()
}

/// Backend configuration for embedding providers
///
/// ```toml
/// # Ollama native API
/// [embedding]
/// backend = "ollama"
/// url = "http://localhost:11434"
/// model = "nomic-embed-text"
///
/// # OpenAI-compatible endpoint (OpenAI, vLLM, LM Studio, TEI)
/// [embedding]
/// backend = "openai"
/// endpoint = "https://api.openai.com/v1/embeddings"
/// model = "text-embedding-3-small"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "backend", rename_all = "lowercase")]
pub enum BackendConfig {
    /// Ollama `/api/embeddings`
    Ollama {
        /// Server base URL
        #[serde(default = "default_ollama_url")]
        url: String,
        /// Model name
        #[serde(default = "default_ollama_model")]
        model: String,
        /// Request timeout in seconds
        #[serde(default = "default_timeout")]
        timeout_secs: u64,
    },
    /// OpenAI-compatible HTTP endpoint
    OpenAi {
        /// API endpoint URL (e.g., "https://api.openai.com/v1/embeddings")
        endpoint: String,
        /// API key (optional, can also use OPENAI_API_KEY env var)
        #[serde(default)]
        api_key: Option<String>,
        /// Model name (e.g., "text-embedding-3-small")
        model: String,
        /// Requested output dimensions, for models that support truncation
        #[serde(default)]
        dimensions: Option<usize>,
        /// Request timeout in seconds
        #[serde(default = "default_timeout")]
        timeout_secs: u64,
        /// Maximum batch size for requests
        #[serde(default = "default_batch_size")]
        max_batch_size: usize,
    },
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self::Ollama {
            url: default_ollama_url(),
            model: default_ollama_model(),
            timeout_secs: default_timeout(),
        }
    }
}

impl BackendConfig {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Ollama { .. } => "ollama",
            Self::OpenAi { .. } => "openai",
        }
    }

    /// Collect validation problems for this backend
    pub(crate) fn validation_errors(&self) -> Vec<String> {
        let mut errors = Vec::new();
        match self {
            Self::Ollama {
                url,
                model,
                timeout_secs,
            } => {
                if url.trim().is_empty() {
                    errors.push("embedding url must not be empty".to_string());
                }
                if model.trim().is_empty() {
                    errors.push("embedding model must not be empty".to_string());
                }
                if *timeout_secs == 0 {
                    errors.push("embedding timeout_secs must be positive".to_string());
                }
            }
            Self::OpenAi {
                endpoint,
                model,
                dimensions,
                timeout_secs,
                max_batch_size,
                ..
            } => {
                if endpoint.trim().is_empty() {
                    errors.push("embedding endpoint must not be empty".to_string());
                }
                if model.trim().is_empty() {
                    errors.push("embedding model must not be empty".to_string());
                }
                if *dimensions == Some(0) {
                    errors.push("embedding dimensions must be positive".to_string());
                }
                if *timeout_secs == 0 {
                    errors.push("embedding timeout_secs must be positive".to_string());
                }
                if *max_batch_size == 0 {
                    errors.push("embedding max_batch_size must be positive".to_string());
                }
            }
        }
        errors
    }
}
