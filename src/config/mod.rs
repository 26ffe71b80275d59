//! Configuration for docprep

mod chunking;
mod embedding;
mod logging;

pub use chunking::{ChunkingConfig, OversizedPolicy, TokenizerConfig};
pub use embedding::BackendConfig;
pub use logging::{LogFormat, LogLevel, LoggingConfig};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default configuration file name
pub const DEFAULT_CONFIG_FILE: &str = "docprep.toml";

/// Upper bound on `max_tokens`; larger budgets exceed every common embedding model
const MAX_TOKENS_LIMIT: usize = 8192;

/// Main configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Chunking configuration
    #[serde(default)]
    pub chunking: ChunkingConfig,
    /// Token counting configuration
    #[serde(default)]
    pub tokenizer: TokenizerConfig,
    /// Embedding backend configuration
    #[serde(default)]
    pub embedding: BackendConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file and validate it.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
        let config = Self::from_toml(&content)
            .with_context(|| format!("Failed to load config file '{}'", path.display()))?;
        Ok(config)
    }

    /// Load from `path` if it exists, otherwise fall back to defaults
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse and validate a TOML document
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content).context("Failed to parse TOML")?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize config")
    }

    /// Validate all configuration fields.
    ///
    /// Collects all validation errors and reports them together.
    pub fn validate(&self) -> Result<()> {
        let mut errors: Vec<String> = Vec::new();

        // Chunking validation
        if self.chunking.max_tokens == 0 {
            errors.push("max_tokens must be positive".to_string());
        }
        if self.chunking.max_tokens > MAX_TOKENS_LIMIT {
            errors.push(format!("max_tokens must be <= {}", MAX_TOKENS_LIMIT));
        }
        if self.chunking.max_tokens > 0 && self.chunking.overlap >= self.chunking.max_tokens {
            errors.push("overlap must be less than max_tokens".to_string());
        }

        errors.extend(self.embedding.validation_errors());

        if errors.is_empty() {
            Ok(())
        } else {
            anyhow::bail!(
                "Configuration validation failed:\n  - {}",
                errors.join("\n  - ")
            );
        }
    }
}
