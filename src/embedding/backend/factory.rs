//! Backend factory for creating embedding backends from configuration

use super::ollama::OllamaBackend;
use super::openai::{OpenAiBackend, OpenAiConfig};
use super::traits::{EmbeddingBackend, EmbeddingResult};
use crate::config::BackendConfig;
use std::sync::Arc;
use tracing::info;

/// Create an embedding backend from configuration
///
/// Returns an `Arc<dyn EmbeddingBackend>` that can be shared across threads.
pub fn create_backend(config: &BackendConfig) -> EmbeddingResult<Arc<dyn EmbeddingBackend>> {
    info!("Creating {} embedding backend", config.name());

    match config {
        BackendConfig::Ollama {
            url,
            model,
            timeout_secs,
        } => Ok(Arc::new(OllamaBackend::new(url, model, *timeout_secs)?)),

        BackendConfig::OpenAi {
            endpoint,
            api_key,
            model,
            dimensions,
            timeout_secs,
            max_batch_size,
        } => {
            let backend = OpenAiBackend::new(OpenAiConfig {
                endpoint: endpoint.clone(),
                api_key: api_key.clone(),
                model: model.clone(),
                dimensions: *dimensions,
                timeout_secs: *timeout_secs,
                max_batch_size: *max_batch_size,
            })?;
            Ok(Arc::new(backend))
        }
    }
}
