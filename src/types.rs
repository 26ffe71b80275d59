//! Core types for the docprep pipeline

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::Path;

/// Unique identifier for a document
pub type DocumentId = String;

/// Unique identifier for a chunk
pub type ChunkId = String;

/// Embedding vector type
pub type Embedding = Vec<f32>;

/// Loader metadata (page counts, sheet names, front matter, ...)
pub type MetaMap = serde_json::Map<String, serde_json::Value>;

/// Hex-encoded SHA-256 of a string
pub fn sha256_hex(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Stable document ID derived from the source path
pub fn document_id_for_path(path: &Path) -> DocumentId {
    let digest = sha256_hex(&path.to_string_lossy());
    digest[..16].to_string()
}

/// A single page of extracted text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    /// 1-based page number
    pub page_number: usize,
    pub text: String,
}

/// Descriptive metadata for a loaded document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentMeta {
    pub doc_id: DocumentId,
    pub source_path: String,
    /// Loader that produced the text ("pdf", "docx", "markdown", ...)
    pub source_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_sha256: Option<String>,
}

/// A document ready for chunking
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: DocumentId,
    /// Normalized text
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pages: Option<Vec<Page>>,
    pub meta: DocumentMeta,
    /// Loader-specific metadata
    #[serde(default)]
    pub extra: MetaMap,
}

impl Document {
    /// Create a document whose ID is derived from its content
    pub fn new(content: impl Into<String>) -> Self {
        let content = content.into();
        let digest = sha256_hex(&content);
        let id = digest[..16].to_string();
        let meta = DocumentMeta {
            doc_id: id.clone(),
            content_sha256: Some(digest),
            ..DocumentMeta::default()
        };
        Self {
            id,
            content,
            pages: None,
            meta,
            extra: MetaMap::new(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self.meta.doc_id = self.id.clone();
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.meta.title = Some(title.into());
        self
    }

    pub fn with_source(mut self, path: impl Into<String>, source_type: impl Into<String>) -> Self {
        self.meta.source_path = path.into();
        self.meta.source_type = source_type.into();
        self
    }

    pub fn with_pages(mut self, pages: Option<Vec<Page>>) -> Self {
        self.pages = pages;
        self
    }

    pub fn with_extra(mut self, extra: MetaMap) -> Self {
        self.extra = extra;
        self
    }

    pub fn title(&self) -> Option<&str> {
        self.meta.title.as_deref()
    }
}

/// Chunk metadata for retrieval and context
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    pub chunk_id: ChunkId,
    pub document_id: DocumentId,
    /// Position of this chunk within its document
    pub index: usize,
    pub source_path: Option<String>,
    pub source_title: Option<String>,
    pub preceding_chunk_id: Option<ChunkId>,
    pub following_chunk_id: Option<ChunkId>,
    pub content_sha256: String,
}

impl ChunkMetadata {
    pub fn new(document_id: &str, index: usize, content: &str) -> Self {
        Self {
            chunk_id: format!("{}_{}", document_id, index),
            document_id: document_id.to_string(),
            index,
            source_path: None,
            source_title: None,
            preceding_chunk_id: None,
            following_chunk_id: None,
            content_sha256: sha256_hex(content),
        }
    }
}

/// A chunk of a document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    pub metadata: ChunkMetadata,
    pub content: String,
    /// Token count for this chunk
    pub token_count: usize,
}

/// A chunk paired with its embedding vector
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddedChunk {
    pub chunk: Chunk,
    pub embedding: Embedding,
}
