//! Text chunking for document indexing
//!
//! Splits raw document text into bounded-size segments that respect line
//! boundaries where possible, and derives the persisted chunk records.

use crate::config::ChunkingConfig;
use crate::error::Result;
use crate::similarity::Embedding;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A raw input document. Ephemeral; exists only during ingestion.
#[derive(Debug, Clone)]
pub struct Document {
    /// Human-readable identifier, usually the file name
    pub name: String,

    /// Unique stable locator for the document
    pub path: String,

    /// Full text content
    pub content: String,
}

impl Document {
    pub fn new(name: impl Into<String>, path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            content: content.into(),
        }
    }

    /// Read a document from a file on disk
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());

        Ok(Self {
            name,
            path: path.to_string_lossy().to_string(),
            content,
        })
    }

    /// Content length in bytes
    pub fn size(&self) -> usize {
        self.content.len()
    }
}

/// A persisted document chunk, the atomic retrievable unit
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChunkRecord {
    /// Derived as `<document-name>_chunk_<index>` (1-based)
    pub name: String,

    /// Storage key; unique across the store
    pub path: String,

    /// The chunk's text
    pub content: String,

    /// Embedding vector, set by the indexing pipeline before persistence
    #[serde(skip)]
    pub embedding: Option<Embedding>,

    /// Timestamp of write, assigned by the store, never by the caller
    pub indexed_at: Option<DateTime<Utc>>,
}

/// Splits document text into bounded, line-boundary-respecting segments
pub struct TextChunker {
    config: ChunkingConfig,
}

impl TextChunker {
    pub fn new(config: ChunkingConfig) -> Self {
        Self { config }
    }

    pub fn with_default_config() -> Self {
        Self::new(ChunkingConfig::default())
    }

    /// Split `content` into non-overlapping segments covering the full
    /// input, in original order.
    ///
    /// Each candidate boundary sits `max_chunk_size` characters past the
    /// cursor; if the window up to it contains a newline, the cut moves back
    /// to the last newline so lines stay whole. Segments are trimmed, and
    /// segments that trim to nothing are dropped.
    pub fn split(&self, content: &str) -> Vec<String> {
        let max_chars = self.config.max_chunk_size.max(1);
        let mut chunks = Vec::new();
        let mut rest = content;

        while !rest.is_empty() {
            // Byte offset just past `max_chars` characters, or None when the
            // remainder already fits in one chunk.
            let boundary = rest.char_indices().nth(max_chars).map(|(i, _)| i);

            let cut = match boundary {
                None => rest.len(),
                Some(limit) => match rest[..limit].rfind('\n') {
                    Some(pos) => pos + 1,
                    None => limit,
                },
            };

            let piece = rest[..cut].trim();
            if !piece.is_empty() {
                chunks.push(piece.to_string());
            }
            rest = &rest[cut..];
        }

        chunks
    }

    /// Chunk a document into persistable records.
    ///
    /// Chunk names are `<document-name>_chunk_<index>` and each chunk gets
    /// its own storage path `<document-path>#chunk-<index>`, so re-indexing
    /// a document replaces its chunks one-for-one.
    pub fn chunk_document(&self, document: &Document) -> Result<Vec<ChunkRecord>> {
        let records = self
            .split(&document.content)
            .into_iter()
            .enumerate()
            .map(|(i, content)| ChunkRecord {
                name: format!("{}_chunk_{}", document.name, i + 1),
                path: format!("{}#chunk-{}", document.path, i + 1),
                content,
                embedding: None,
                indexed_at: None,
            })
            .collect();

        Ok(records)
    }
}
