//! Document splitting into identified, linked chunks

use super::packer::ChunkPacker;
use super::tokenizer::TokenCounter;
use crate::config::ChunkingConfig;
use crate::types::{Chunk, ChunkMetadata, Document};
use tracing::debug;

/// Text splitter for creating chunks from whole documents
pub struct TextSplitter<'a> {
    packer: ChunkPacker<'a>,
    counter: &'a dyn TokenCounter,
}

impl<'a> TextSplitter<'a> {
    /// Create a new text splitter
    pub fn new(counter: &'a dyn TokenCounter, config: ChunkingConfig) -> Self {
        Self {
            packer: ChunkPacker::new(counter, config),
            counter,
        }
    }

    /// Split a document into chunks
    pub fn split_document(&self, document: &Document) -> Vec<Chunk> {
        if document.content.is_empty() {
            return Vec::new();
        }

        let source_path = Some(document.meta.source_path.clone()).filter(|p| !p.is_empty());

        let mut chunks: Vec<Chunk> = self
            .packer
            .pack(&document.content)
            .into_iter()
            .enumerate()
            .map(|(index, content)| {
                let mut metadata = ChunkMetadata::new(&document.id, index, &content);
                metadata.source_path = source_path.clone();
                metadata.source_title = document.meta.title.clone();
                Chunk {
                    token_count: self.counter.count_tokens(&content),
                    metadata,
                    content,
                }
            })
            .collect();

        self.link_chunks(&mut chunks);

        debug!(
            "Split document {} into {} chunks",
            document.id,
            chunks.len()
        );

        chunks
    }

    /// Link chunks with preceding/following references
    fn link_chunks(&self, chunks: &mut [Chunk]) {
        let chunk_ids: Vec<String> = chunks.iter().map(|c| c.metadata.chunk_id.clone()).collect();

        for (i, chunk) in chunks.iter_mut().enumerate() {
            if i > 0 {
                chunk.metadata.preceding_chunk_id = Some(chunk_ids[i - 1].clone());
            }
            if i + 1 < chunk_ids.len() {
                chunk.metadata.following_chunk_id = Some(chunk_ids[i + 1].clone());
            }
        }
    }
}
