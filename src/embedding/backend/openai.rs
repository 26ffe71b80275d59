//! HTTP embedding backend for OpenAI-compatible APIs
//!
//! This backend supports any OpenAI-compatible embedding API, including:
//! - OpenAI API
//! - Azure OpenAI
//! - Local servers (LM Studio, vLLM, text-embeddings-inference)

use super::http::{build_client, post_json};
use super::retry::RetryPolicy;
use super::traits::{EmbeddingBackend, EmbeddingError, EmbeddingResult};
use crate::types::Embedding;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Settings for the OpenAI-compatible backend
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    /// API endpoint (e.g., "https://api.openai.com/v1/embeddings")
    pub endpoint: String,
    /// API key (falls back to the OPENAI_API_KEY env var)
    pub api_key: Option<String>,
    /// Model name (e.g., "text-embedding-3-small")
    pub model: String,
    /// Requested output dimensions
    pub dimensions: Option<usize>,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Maximum texts per request
    pub max_batch_size: usize,
}

/// OpenAI embedding request format
#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [&'a str],
    #[serde(skip_serializing_if = "Option::is_none")]
    dimensions: Option<usize>,
    encoding_format: &'a str,
}

/// OpenAI embedding response format
#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
    index: usize,
}

#[derive(Debug, Deserialize)]
struct Usage {
    total_tokens: usize,
}

/// HTTP embedding backend for OpenAI-compatible APIs
#[derive(Debug)]
pub struct OpenAiBackend {
    client: Client,
    config: OpenAiConfig,
    retry: RetryPolicy,
}

impl OpenAiBackend {
    pub fn new(config: OpenAiConfig) -> EmbeddingResult<Self> {
        info!(
            "Initializing OpenAI-compatible embedding backend: endpoint={}, model={}",
            config.endpoint, config.model
        );

        let api_key = config
            .api_key
            .clone()
            .or_else(|| std::env::var("OPENAI_API_KEY").ok());
        if api_key.is_none()
            && (config.endpoint.contains("openai.com") || config.endpoint.contains("azure.com"))
        {
            warn!("No API key provided for {}", config.endpoint);
        }

        let client = build_client(config.timeout_secs, api_key.as_deref())?;
        Ok(Self {
            client,
            config,
            retry: RetryPolicy::default(),
        })
    }

    /// Replace the retry schedule
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// One request for up to `max_batch_size` texts, retried as a unit
    fn request_embeddings(&self, texts: &[&str]) -> EmbeddingResult<Vec<Embedding>> {
        let body = serde_json::to_vec(&EmbeddingRequest {
            model: &self.config.model,
            input: texts,
            dimensions: self.config.dimensions,
            encoding_format: "float",
        })
        .map_err(|e| EmbeddingError::Internal(format!("Failed to serialize request: {}", e)))?;

        debug!(
            "Sending embedding request to {} for {} texts",
            self.config.endpoint,
            texts.len()
        );

        let text = self.retry.run("Embedding request", || {
            post_json(&self.client, &self.config.endpoint, &body)
        })?;

        let response: EmbeddingResponse = serde_json::from_str(&text)
            .map_err(|e| EmbeddingError::MalformedResponse(format!("Failed to parse response: {}", e)))?;
        if let Some(usage) = &response.usage {
            debug!("Embedding request used {} tokens", usage.total_tokens);
        }

        if response.data.len() != texts.len() {
            return Err(EmbeddingError::MalformedResponse(format!(
                "expected {} embeddings, got {}",
                texts.len(),
                response.data.len()
            )));
        }

        let mut data = response.data;
        data.sort_by_key(|d| d.index);
        Ok(data.into_iter().map(|d| d.embedding).collect())
    }
}

impl EmbeddingBackend for OpenAiBackend {
    fn embed_one(&self, text: &str) -> EmbeddingResult<Embedding> {
        self.request_embeddings(&[text])?
            .into_iter()
            .next()
            .ok_or_else(|| EmbeddingError::MalformedResponse("No embedding returned".to_string()))
    }

    fn embed_batch(&self, texts: &[String]) -> EmbeddingResult<Vec<Embedding>> {
        let text_refs: Vec<&str> = texts.iter().map(String::as_str).collect();
        let mut all_embeddings = Vec::with_capacity(texts.len());

        for batch in text_refs.chunks(self.config.max_batch_size.max(1)) {
            all_embeddings.extend(self.request_embeddings(batch)?);
        }

        Ok(all_embeddings)
    }

    fn embedding_dim(&self) -> EmbeddingResult<usize> {
        match self.config.dimensions {
            Some(dim) => Ok(dim),
            None => self.embed_one(super::traits::DIMENSION_PROBE).map(|v| v.len()),
        }
    }

    fn name(&self) -> &str {
        "openai"
    }
}
