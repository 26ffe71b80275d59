use super::OutputFormat;
use anyhow::Result;
use docprep::config::Config;
use docprep::pipeline::Pipeline;
use docprep::types::Chunk;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use tracing::info;

/// Command-line overrides for the `[chunking]` section
#[derive(Debug, Default)]
pub struct ChunkOverrides {
    pub max_tokens: Option<usize>,
    pub overlap: Option<usize>,
    pub min_sent_tokens: Option<usize>,
}

impl ChunkOverrides {
    /// Apply overrides and re-validate
    pub fn apply(self, mut config: Config) -> Result<Config> {
        if let Some(v) = self.max_tokens {
            config.chunking.max_tokens = v;
        }
        if let Some(v) = self.overlap {
            config.chunking.overlap = v;
        }
        if let Some(v) = self.min_sent_tokens {
            config.chunking.min_sent_tokens = v;
        }
        config.validate()?;
        Ok(config)
    }
}

pub fn chunk_documents(
    config: Config,
    path: PathBuf,
    format: OutputFormat,
    overrides: ChunkOverrides,
) -> Result<()> {
    let config = overrides.apply(config)?;
    let pipeline = Pipeline::new(&config);

    let results = pipeline.process_path(&path)?;
    let chunks: Vec<Chunk> = results.into_iter().flat_map(|(_, chunks)| chunks).collect();
    info!("Produced {} chunks", chunks.len());

    let stdout = std::io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    match format {
        OutputFormat::Text => {
            for chunk in &chunks {
                writeln!(
                    out,
                    "--- {} ({} tokens) ---\n{}\n",
                    chunk.metadata.chunk_id, chunk.token_count, chunk.content
                )?;
            }
        }
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut out, &chunks)?;
            writeln!(out)?;
        }
        OutputFormat::Jsonl => {
            for chunk in &chunks {
                serde_json::to_writer(&mut out, chunk)?;
                writeln!(out)?;
            }
        }
    }

    out.flush()?;
    Ok(())
}
