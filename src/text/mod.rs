//! Text processing and chunking functionality for docdex-rs

pub mod chunking;

// Re-export main types and functions
pub use chunking::{ChunkRecord, Document, TextChunker};
