//! docdex-rs CLI application
//!
//! Command-line interface for the docdex-rs library.

use anyhow::bail;
use clap::{Parser, Subcommand};
use docdex_rs::{
    ChunkingConfig, Config, DocdexIndexer, DocdexRetriever, EmbeddingConfig, IndexingStats,
    OllamaEmbedder, RetrievalConfig, VectorStore, chat_session, utils,
};
use indicatif::ProgressBar;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "docdex-rs")]
#[command(about = "Document indexing and semantic retrieval for retrieval-augmented generation")]
#[command(version)]
struct Cli {
    /// Vector store location (SQLite database)
    #[arg(short, long, global = true, default_value = "docdex.db")]
    store: PathBuf,

    /// Base URL of the embedding service
    #[arg(long, global = true, default_value = "http://localhost:11434")]
    base_url: String,

    /// Embedding model identifier
    #[arg(long, global = true, default_value = "nomic-embed-text")]
    model: String,

    /// Embedding request timeout in seconds
    #[arg(long, global = true, default_value = "30")]
    timeout: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Index documents into the vector store
    Index {
        /// Input file(s) to index (txt, md)
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Maximum chunk size in characters
        #[arg(long, default_value = "2000")]
        chunk_size: usize,
    },

    /// Search the indexed documents
    Search {
        /// Search query
        query: String,

        /// Number of results to return
        #[arg(short = 'k', long, default_value = "3")]
        top_k: usize,

        /// Minimum similarity for a result to be kept
        #[arg(short = 't', long, default_value = "0.5")]
        threshold: f32,
    },

    /// Interactive chat with your documents
    Chat {
        /// API key for the chat LLM (leave empty for context-only mode)
        #[arg(long, default_value = "")]
        api_key: String,

        /// Base URL for an OpenAI-compatible chat API
        #[arg(long)]
        llm_base_url: Option<String>,

        /// Chat model name
        #[arg(long)]
        llm_model: Option<String>,
    },

    /// Show index statistics
    Stats,

    /// Delete every indexed chunk
    Clear {
        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },
}

impl Cli {
    fn config(&self, chunk_size: usize, retrieval: RetrievalConfig) -> Config {
        Config {
            store_path: self.store.clone(),
            embedding: EmbeddingConfig {
                base_url: self.base_url.clone(),
                model: self.model.clone(),
                timeout_secs: self.timeout,
            },
            chunking: ChunkingConfig {
                max_chunk_size: chunk_size,
            },
            retrieval,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    env_logger::init();

    let cli = Cli::parse();

    match &cli.command {
        Commands::Index { inputs, chunk_size } => {
            let config = cli.config(*chunk_size, RetrievalConfig::default());
            index_command(&config, inputs).await?;
        }
        Commands::Search {
            query,
            top_k,
            threshold,
        } => {
            let config = cli.config(
                2000,
                RetrievalConfig {
                    top_k: *top_k,
                    threshold: *threshold,
                },
            );
            search_command(&config, query).await?;
        }
        Commands::Chat {
            api_key,
            llm_base_url,
            llm_model,
        } => {
            let config = cli.config(2000, RetrievalConfig::default());
            chat_command(&config, api_key, llm_base_url.as_deref(), llm_model.as_deref()).await?;
        }
        Commands::Stats => {
            let config = cli.config(2000, RetrievalConfig::default());
            stats_command(&config)?;
        }
        Commands::Clear { yes } => {
            let config = cli.config(2000, RetrievalConfig::default());
            clear_command(&config, *yes)?;
        }
    }

    Ok(())
}

async fn index_command(config: &Config, inputs: &[PathBuf]) -> anyhow::Result<()> {
    config.validate()?;

    let embedder = OllamaEmbedder::new(&config.embedding)?;
    let store = VectorStore::open(&config.store_path)?;
    let mut indexer = DocdexIndexer::new(config, embedder, store);

    let progress = ProgressBar::new(inputs.len() as u64);
    let mut stats = IndexingStats::default();
    let start_time = std::time::Instant::now();

    for input in inputs {
        if !utils::is_supported_document(input) {
            log::warn!("Skipping unsupported file: {}", input.display());
            progress.inc(1);
            continue;
        }

        match indexer.index_file(input).await {
            Ok(chunks) => {
                stats.documents += 1;
                stats.chunks += chunks;
            }
            Err(e) => {
                log::error!("Failed to index {}: {}", input.display(), e);
            }
        }
        progress.inc(1);
    }
    progress.finish_and_clear();
    stats.processing_time = start_time.elapsed().as_secs_f64();

    let store_stats = indexer.store().stats()?;
    indexer.close()?;

    println!(
        "Indexed {} documents ({} chunks) in {:.2}s",
        stats.documents, stats.chunks, stats.processing_time
    );
    println!(
        "Store: {} ({})",
        config.store_path.display(),
        utils::format_file_size(store_stats.file_size_bytes as u64)
    );

    Ok(())
}

async fn search_command(config: &Config, query: &str) -> anyhow::Result<()> {
    config.validate()?;

    let embedder = OllamaEmbedder::new(&config.embedding)?;
    let store = VectorStore::open(&config.store_path)?;
    let mut retriever = DocdexRetriever::new(store, embedder, config.retrieval.clone());

    let start_time = std::time::Instant::now();
    let results = retriever
        .retrieve(query, config.retrieval.top_k, config.retrieval.threshold)
        .await?;
    let elapsed = start_time.elapsed();

    if results.is_empty() {
        println!("No results above threshold {}", config.retrieval.threshold);
    } else {
        println!("Found {} results in {:.3}s:\n", results.len(), elapsed.as_secs_f64());
        for (i, result) in results.iter().enumerate() {
            let content = &result.chunk.content;
            let preview = if content.chars().count() > 100 {
                format!("{}...", content.chars().take(100).collect::<String>())
            } else {
                content.clone()
            };
            println!("{}. [{:.3}] {} - {}", i + 1, result.similarity, result.chunk.name, preview);
        }
    }

    retriever.close()?;
    Ok(())
}

async fn chat_command(
    config: &Config,
    api_key: &str,
    llm_base_url: Option<&str>,
    llm_model: Option<&str>,
) -> anyhow::Result<()> {
    config.validate()?;

    let embedder = OllamaEmbedder::new(&config.embedding)?;
    let store = VectorStore::open(&config.store_path)?;
    let mut retriever = DocdexRetriever::new(store, embedder, config.retrieval.clone());

    chat_session(&retriever, api_key, llm_base_url, llm_model).await?;

    retriever.close()?;
    Ok(())
}

fn stats_command(config: &Config) -> anyhow::Result<()> {
    let mut store = VectorStore::open(&config.store_path)?;
    let stats = store.stats()?;

    println!("Store: {}", config.store_path.display());
    println!("  Chunks: {}", stats.chunk_count);
    println!("  Size: {}", utils::format_file_size(stats.file_size_bytes as u64));

    store.close()?;
    Ok(())
}

fn clear_command(config: &Config, yes: bool) -> anyhow::Result<()> {
    if !yes {
        bail!("Refusing to clear the store without --yes");
    }

    let mut store = VectorStore::open(&config.store_path)?;
    let before = store.count()?;
    store.clear()?;
    store.close()?;

    println!("Removed {} chunks from {}", before, config.store_path.display());
    Ok(())
}
