use anyhow::{Context, Result};
use docprep::config::Config;
use docprep::embedding::create_backend;
use docprep::pipeline::Pipeline;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::time::Instant;
use tracing::info;

/// Load, chunk and embed documents, writing one embedded chunk per JSON line
pub fn embed_documents(config: Config, path: PathBuf, output: Option<PathBuf>) -> Result<()> {
    let pipeline = Pipeline::new(&config);
    let backend = create_backend(&config.embedding)
        .context("Failed to initialize embedding backend")?;

    let mut out: Box<dyn Write> = match &output {
        Some(file) => Box::new(BufWriter::new(
            File::create(file).with_context(|| format!("Failed to create {}", file.display()))?,
        )),
        None => Box::new(BufWriter::new(std::io::stdout().lock())),
    };

    let start = Instant::now();
    let mut total = 0;
    for (doc, chunks) in pipeline.process_path(&path)? {
        let embedded = pipeline
            .embed_chunks(backend.as_ref(), chunks)
            .with_context(|| format!("Failed to embed {}", doc.meta.source_path))?;

        for item in &embedded {
            serde_json::to_writer(&mut out, item)?;
            writeln!(out)?;
        }
        info!("Embedded {} chunks from {}", embedded.len(), doc.meta.source_path);
        total += embedded.len();
    }
    out.flush()?;

    info!(
        "Embedded {} chunks with {} in {:?}",
        total,
        backend.name(),
        start.elapsed()
    );
    if let Some(file) = output {
        println!("Wrote {} embedded chunks to {}", total, file.display());
    }

    Ok(())
}
