use anyhow::{Context, Result};
use docprep::config::Config;
use docprep::embedding::create_backend;

/// Report the configured backend and its embedding dimension
pub fn probe_backend(config: Config) -> Result<()> {
    let backend = create_backend(&config.embedding)
        .context("Failed to initialize embedding backend")?;
    let dim = backend
        .embedding_dim()
        .with_context(|| format!("Failed to probe {} backend", backend.name()))?;

    println!("backend: {}", backend.name());
    println!("dimensions: {}", dim);
    Ok(())
}
