//! # docdex-rs
//!
//! A document indexing and semantic retrieval engine for
//! retrieval-augmented generation: documents are chunked, embedded through
//! an external embedding service, persisted in an embedded SQLite vector
//! store, and retrieved by cosine similarity to supply context to a
//! downstream language model.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use docdex_rs::{
//!     Config, DocdexIndexer, DocdexRetriever, Document, OllamaEmbedder, SearchRequest,
//!     VectorStore,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::default();
//!
//!     // Index a document
//!     let embedder = OllamaEmbedder::new(&config.embedding)?;
//!     let store = VectorStore::open(&config.store_path)?;
//!     let mut indexer = DocdexIndexer::new(&config, embedder, store);
//!     let document = Document::new("notes.txt", "/docs/notes.txt", "Your text here");
//!     let chunks = indexer.index_document(&document).await?;
//!     println!("Indexed {} chunks", chunks);
//!     indexer.close()?;
//!
//!     // Query it
//!     let embedder = OllamaEmbedder::new(&config.embedding)?;
//!     let store = VectorStore::open(&config.store_path)?;
//!     let mut retriever = DocdexRetriever::new(store, embedder, config.retrieval.clone());
//!     let response = retriever.search(SearchRequest::new("your question")).await?;
//!
//!     for result in &response.results {
//!         println!("{:.3} - {}", result.similarity, result.chunk.name);
//!     }
//!     println!("{}", response.context);
//!     retriever.close()?;
//!
//!     Ok(())
//! }
//! ```

// Core modules
pub mod api;
pub mod config;
pub mod embedding;
pub mod error;
pub mod similarity;
pub mod storage;
pub mod text;
pub mod utils;

// Re-export main API types
pub use api::{
    DocdexIndexer, DocdexRetriever, IndexingStats, NO_RESULTS_CONTEXT, SearchRequest,
    SearchResponse, SearchResult, assemble_context, chat_session, quick_query,
};
pub use config::{ChunkingConfig, Config, EmbeddingConfig, RetrievalConfig};
pub use embedding::{EmbeddingProvider, OllamaEmbedder, embed_batch};
pub use error::{DocdexError, Result};
pub use similarity::{Embedding, cosine_similarity};
pub use storage::{StoreStats, VectorStore};
pub use text::{ChunkRecord, Document, TextChunker};
