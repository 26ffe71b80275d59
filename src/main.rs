//! docprep: prepare documents for retrieval-augmented generation
//!
//! Extracts text from PDF, DOCX, Markdown, spreadsheet and plain-text files,
//! splits it into overlapping token-bounded chunks and sends them to an
//! embedding service.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{ChunkOverrides, OutputFormat};
use docprep::config::{Config, LogFormat, DEFAULT_CONFIG_FILE};
use std::path::PathBuf;
use tracing::debug;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "docprep")]
#[command(about = "Chunk documents and embed them for retrieval")]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default configuration file
    Init {
        /// Output directory
        #[arg(default_value = ".")]
        path: PathBuf,
    },

    /// Load and chunk a document or directory, printing the chunks
    Chunk {
        /// Path to document or directory
        path: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,

        /// Token budget per chunk
        #[arg(long)]
        max_tokens: Option<usize>,

        /// Tokens carried over between consecutive chunks
        #[arg(long)]
        overlap: Option<usize>,

        /// Minimum tokens before a chunk may be flushed
        #[arg(long)]
        min_sent_tokens: Option<usize>,
    },

    /// Load, chunk and embed a document or directory (JSONL output)
    Embed {
        /// Path to document or directory
        path: PathBuf,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show the embedding backend and its output dimension
    Probe,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::load_or_default(&cli.config)?;
    init_logging(&config, cli.verbose)?;
    debug!("Loaded configuration from {}", cli.config.display());

    match cli.command {
        Commands::Init { path } => commands::init_config(path),
        Commands::Chunk {
            path,
            format,
            max_tokens,
            overlap,
            min_sent_tokens,
        } => commands::chunk_documents(
            config,
            path,
            format,
            ChunkOverrides {
                max_tokens,
                overlap,
                min_sent_tokens,
            },
        ),
        Commands::Embed { path, output } => commands::embed_documents(config, path, output),
        Commands::Probe => commands::probe_backend(config),
    }
}

/// Install the global subscriber; logs go to stderr, `RUST_LOG` wins over config
fn init_logging(config: &Config, verbose: u8) -> Result<()> {
    let level = config.logging.level.with_verbosity(verbose);
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::default().add_directive(LevelFilter::from_level(level).into()));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    match config.logging.format {
        LogFormat::Text => tracing::subscriber::set_global_default(builder.finish())?,
        LogFormat::Json => tracing::subscriber::set_global_default(builder.json().finish())?,
    }
    Ok(())
}
