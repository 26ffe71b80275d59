//! docprep: document preparation for retrieval-augmented generation
//!
//! - Text extraction from PDF, DOCX, Markdown, XLSX and plain text
//! - Sentence-aware chunking under a token budget, with overlap
//! - Exact (HF tokenizer) or heuristic token counting
//! - Embedding via Ollama or OpenAI-compatible HTTP APIs, with bounded retry

pub mod chunking;
pub mod config;
pub mod content;
pub mod embedding;
pub mod pipeline;
pub mod types;

pub use config::Config;
pub use pipeline::Pipeline;
pub use types::*;
