//! Error types for docdex-rs
//!
//! This module provides comprehensive error handling for all docdex operations,
//! including chunking, embedding generation, storage, and retrieval.

use thiserror::Error;

/// Main error type for docdex operations
#[derive(Error, Debug)]
pub enum DocdexError {
    /// Mismatched vector lengths in a similarity computation
    #[error("Embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Storage medium unavailable or write rejected
    #[error("Storage error: {0}")]
    Persistence(String),

    /// A stored record whose embedding cannot be decoded
    #[error("Corrupt record at '{path}': {reason}")]
    CorruptRecord { path: String, reason: String },

    /// External embedding service failure
    #[error("Embedding provider error: {0}")]
    EmbeddingProvider(String),

    /// Any failure raised while serving a retrieval call, with its cause
    #[error("Retrieval failed: {0}")]
    Retrieval(#[source] Box<DocdexError>),

    /// Operation attempted on a closed store handle
    #[error("Store is closed")]
    ClosedStore,

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// SQLite database errors
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
}

impl DocdexError {
    /// Wrap an error raised inside the retrieval pipeline
    pub(crate) fn retrieval(cause: DocdexError) -> Self {
        DocdexError::Retrieval(Box::new(cause))
    }
}

/// Result type alias for docdex operations
pub type Result<T> = std::result::Result<T, DocdexError>;
