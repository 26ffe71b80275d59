mod chunk;
mod embed;
mod init;
mod probe;

pub use chunk::{chunk_documents, ChunkOverrides};
pub use embed::embed_documents;
pub use init::init_config;
pub use probe::probe_backend;

/// Output format for printed chunks
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Jsonl,
}
