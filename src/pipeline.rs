//! Load → chunk → embed pipeline for files and directories

use crate::chunking::{TextSplitter, TokenizerStrategy};
use crate::config::Config;
use crate::content::LoaderKind;
use crate::embedding::{EmbeddingBackend, EmbeddingError, EmbeddingResult};
use crate::types::{document_id_for_path, Chunk, Document, DocumentMeta, EmbeddedChunk};
use anyhow::{Context, Result};
use rayon::prelude::*;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Document preparation pipeline
///
/// Holds the configuration and the tokenizer strategy chosen at construction;
/// both are shared read-only across documents.
#[derive(Debug)]
pub struct Pipeline {
    config: Config,
    tokenizer: TokenizerStrategy,
}

impl Pipeline {
    pub fn new(config: &Config) -> Self {
        let tokenizer = TokenizerStrategy::from_config(&config.tokenizer);
        info!("Using {} token counting", tokenizer.name());
        Self {
            config: config.clone(),
            tokenizer,
        }
    }

    /// Load one file into a `Document`
    pub fn load_document(&self, path: &Path) -> Result<Document> {
        let kind = LoaderKind::from_path(path);
        let loaded = kind
            .load(path)
            .with_context(|| format!("Failed to load {}", path.display()))?;

        let mut doc = Document::new(loaded.text)
            .with_id(document_id_for_path(path))
            .with_source(path.display().to_string(), kind.name())
            .with_pages(loaded.pages);

        if let Some(Value::Object(frontmatter)) = loaded.meta.get("frontmatter") {
            apply_front_matter(&mut doc.meta, frontmatter);
        }
        if doc.meta.title.is_none() {
            doc.meta.title = loaded.title;
        }

        debug!(
            "Loaded {} as {} ({} chars)",
            path.display(),
            kind,
            doc.content.chars().count()
        );
        Ok(doc.with_extra(loaded.meta))
    }

    /// Split a document into linked chunks
    pub fn chunk_document(&self, doc: &Document) -> Vec<Chunk> {
        TextSplitter::new(&self.tokenizer, self.config.chunking.clone()).split_document(doc)
    }

    /// Load and chunk a file, or every file under a directory.
    ///
    /// Directory entries are visited in path order and processed in parallel;
    /// files that fail to load are skipped with a warning.
    pub fn process_path(&self, path: &Path) -> Result<Vec<(Document, Vec<Chunk>)>> {
        if path.is_file() {
            let doc = self.load_document(path)?;
            let chunks = self.chunk_document(&doc);
            return Ok(vec![(doc, chunks)]);
        }
        if !path.is_dir() {
            anyhow::bail!("Path does not exist: {}", path.display());
        }

        let files: Vec<PathBuf> = WalkDir::new(path)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .map(|e| e.into_path())
            .collect();

        info!("Processing {} files under {}", files.len(), path.display());
        let start = Instant::now();

        let results: Vec<(Document, Vec<Chunk>)> = files
            .par_iter()
            .filter_map(|file| match self.load_document(file) {
                Ok(doc) => {
                    let chunks = self.chunk_document(&doc);
                    Some((doc, chunks))
                }
                Err(e) => {
                    warn!("Skipping {}: {:#}", file.display(), e);
                    None
                }
            })
            .collect();

        let chunk_count: usize = results.iter().map(|(_, chunks)| chunks.len()).sum();
        info!(
            "Prepared {} documents ({} chunks) in {:?}",
            results.len(),
            chunk_count,
            start.elapsed()
        );
        Ok(results)
    }

    /// Embed chunks in order, pairing each with its vector
    pub fn embed_chunks(
        &self,
        backend: &dyn EmbeddingBackend,
        chunks: Vec<Chunk>,
    ) -> EmbeddingResult<Vec<EmbeddedChunk>> {
        if chunks.is_empty() {
            return Ok(Vec::new());
        }

        let texts: Vec<String> = chunks.iter().map(|c| c.content.clone()).collect();
        let embeddings = backend.embed_batch(&texts)?;
        if embeddings.len() != chunks.len() {
            return Err(EmbeddingError::MalformedResponse(format!(
                "expected {} embeddings, got {}",
                chunks.len(),
                embeddings.len()
            )));
        }

        debug!("Embedded {} chunks with {}", chunks.len(), backend.name());
        Ok(chunks
            .into_iter()
            .zip(embeddings)
            .map(|(chunk, embedding)| EmbeddedChunk { chunk, embedding })
            .collect())
    }
}

/// Copy well-known front matter keys into document metadata
fn apply_front_matter(meta: &mut DocumentMeta, frontmatter: &serde_json::Map<String, Value>) {
    let field = |key: &str| frontmatter.get(key).and_then(scalar_string);

    meta.title = field("title");
    meta.author = field("author");
    meta.created_at = field("date").or_else(|| field("created_at"));
    meta.version = field("version");
}

fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
