//! Ollama native embedding backend (`POST /api/embeddings`)

use super::http::{build_client, post_json};
use super::retry::RetryPolicy;
use super::traits::{EmbeddingBackend, EmbeddingError, EmbeddingResult};
use crate::types::Embedding;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    embedding: Vec<f32>,
}

/// Ollama embedding backend; one request per text
#[derive(Debug)]
pub struct OllamaBackend {
    client: Client,
    endpoint: String,
    model: String,
    retry: RetryPolicy,
}

impl OllamaBackend {
    /// Create a backend for the server at `url` (e.g. `http://localhost:11434`)
    pub fn new(url: &str, model: &str, timeout_secs: u64) -> EmbeddingResult<Self> {
        let endpoint = format!("{}/api/embeddings", url.trim_end_matches('/'));
        info!("Initializing Ollama embedding backend: endpoint={}, model={}", endpoint, model);

        Ok(Self {
            client: build_client(timeout_secs, None)?,
            endpoint,
            model: model.to_string(),
            retry: RetryPolicy::default(),
        })
    }

    /// Replace the retry schedule
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    fn request_embedding(&self, text: &str) -> EmbeddingResult<Embedding> {
        let body = serde_json::to_vec(&EmbeddingRequest {
            model: &self.model,
            prompt: text,
        })
        .map_err(|e| EmbeddingError::Internal(format!("Failed to serialize request: {}", e)))?;

        debug!("Sending embedding request to {} ({} chars)", self.endpoint, text.len());
        let text = post_json(&self.client, &self.endpoint, &body)?;

        let response: EmbeddingResponse = serde_json::from_str(&text)
            .map_err(|e| EmbeddingError::MalformedResponse(format!("Failed to parse response: {}", e)))?;
        if response.embedding.is_empty() {
            return Err(EmbeddingError::MalformedResponse(format!(
                "model '{}' returned an empty embedding",
                self.model
            )));
        }
        Ok(response.embedding)
    }
}

impl EmbeddingBackend for OllamaBackend {
    fn embed_one(&self, text: &str) -> EmbeddingResult<Embedding> {
        self.retry.run("Ollama embedding request", || self.request_embedding(text))
    }

    fn name(&self) -> &str {
        "ollama"
    }
}

#[cfg(test)]
mod tests {
    use super::super::http::test_server::{Reply, TestServer};
    use super::super::retry::fast_policy;
    use super::*;

    fn backend(server: &TestServer, attempts: u32) -> OllamaBackend {
        OllamaBackend::new(&format!("{}/", server.base_url), "nomic-embed-text", 5)
            .unwrap()
            .with_retry_policy(fast_policy(attempts))
    }

    #[test]
    fn test_embed_one_request_shape() {
        let server = TestServer::start(vec![Reply::json(200, r#"{"embedding":[0.5,-1.0,2.0]}"#)]);
        let embedding = backend(&server, 5).embed_one("hello world").unwrap();

        assert_eq!(embedding, vec![0.5, -1.0, 2.0]);
        let requests = server.requests();
        assert_eq!(requests[0].0, "/api/embeddings");
        let sent: serde_json::Value = serde_json::from_str(&requests[0].1).unwrap();
        assert_eq!(
            sent,
            serde_json::json!({"model": "nomic-embed-text", "prompt": "hello world"})
        );
    }

    #[test]
    fn test_retries_server_errors() {
        let server = TestServer::start(vec![
            Reply::json(500, "boom"),
            Reply::json(429, "{}").with_header("Retry-After", "0"),
            Reply::json(200, r#"{"embedding":[1.0]}"#),
        ]);
        let embedding = backend(&server, 5).embed_one("x").unwrap();

        assert_eq!(embedding, vec![1.0]);
        assert_eq!(server.requests().len(), 3);
    }

    #[test]
    fn test_gives_up_after_max_attempts() {
        let server = TestServer::start((0..3).map(|_| Reply::json(503, "down")).collect());
        let err = backend(&server, 3).embed_one("x").unwrap_err();

        assert!(matches!(err, EmbeddingError::RetriesExhausted { attempts: 3, .. }));
        assert_eq!(server.requests().len(), 3);
    }

    #[test]
    fn test_malformed_body_not_retried() {
        let server = TestServer::start(vec![Reply::json(200, "not json"), Reply::json(200, "{}")]);
        let err = backend(&server, 5).embed_one("x").unwrap_err();

        assert!(matches!(err, EmbeddingError::MalformedResponse(_)));
        assert_eq!(server.requests().len(), 1);
    }

    #[test]
    fn test_batch_and_dimension() {
        let server = TestServer::start(vec![
            Reply::json(200, r#"{"embedding":[1.0,0.0]}"#),
            Reply::json(200, r#"{"embedding":[0.0,1.0]}"#),
            Reply::json(200, r#"{"embedding":[0.0,0.0]}"#),
        ]);
        let backend = backend(&server, 1);

        let out = backend
            .embed_batch(&["first".to_string(), "second".to_string()])
            .unwrap();
        assert_eq!(out, vec![vec![1.0, 0.0], vec![0.0, 1.0]]);
        assert_eq!(backend.embedding_dim().unwrap(), 2);
        assert!(server.requests()[2].1.contains("dimension probe"));
    }
}
