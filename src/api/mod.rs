//! API layer for docdex-rs
//!
//! This module provides the main public interfaces for indexing documents
//! and retrieving semantically similar chunks.

pub mod chat;
pub mod context;
pub mod indexer;
pub mod retriever;

// Re-export main API types
pub use chat::{chat_session, quick_query};
pub use context::{NO_RESULTS_CONTEXT, assemble_context};
pub use indexer::{DocdexIndexer, IndexingStats};
pub use retriever::{DocdexRetriever, SearchRequest, SearchResponse, SearchResult};
