//! DocdexIndexer - Main ingestion API
//!
//! Turns raw documents into persisted, embedded chunks: chunk the text,
//! embed every chunk, and commit them to the store as one atomic batch.

use crate::config::Config;
use crate::embedding::{EmbeddingProvider, embed_batch};
use crate::error::Result;
use crate::storage::VectorStore;
use crate::text::{Document, TextChunker};
use std::path::Path;

/// Concurrent in-flight embedding requests per document
const EMBED_CONCURRENCY: usize = 4;

/// Aggregate statistics for an ingestion run
#[derive(Debug, Clone, Default)]
pub struct IndexingStats {
    /// Documents successfully indexed
    pub documents: usize,

    /// Chunks persisted across all documents
    pub chunks: usize,

    /// Total processing time in seconds
    pub processing_time: f64,
}

/// Main indexer for ingesting documents into the vector store
pub struct DocdexIndexer<P: EmbeddingProvider> {
    chunker: TextChunker,
    provider: P,
    store: VectorStore,
}

impl<P: EmbeddingProvider> DocdexIndexer<P> {
    pub fn new(config: &Config, provider: P, store: VectorStore) -> Self {
        Self {
            chunker: TextChunker::new(config.chunking.clone()),
            provider,
            store,
        }
    }

    /// Index a single document: chunk, embed, and persist atomically.
    ///
    /// Either every chunk of the document becomes visible or none does; a
    /// failure leaves the store as it was. Returns the number of chunks
    /// persisted.
    pub async fn index_document(&mut self, document: &Document) -> Result<usize> {
        let mut records = self.chunker.chunk_document(document)?;
        if records.is_empty() {
            log::warn!("Document '{}' produced no chunks, skipping", document.name);
            return Ok(0);
        }

        let texts: Vec<String> = records.iter().map(|r| r.content.clone()).collect();
        let embeddings = embed_batch(&self.provider, &texts, EMBED_CONCURRENCY).await?;

        for (record, embedding) in records.iter_mut().zip(embeddings) {
            record.embedding = Some(embedding);
        }

        self.store.bulk_upsert(&records)?;

        log::info!(
            "Indexed '{}' ({} bytes) as {} chunks",
            document.name,
            document.size(),
            records.len()
        );
        Ok(records.len())
    }

    /// Read a file from disk and index it
    pub async fn index_file<F: AsRef<Path>>(&mut self, path: F) -> Result<usize> {
        let document = Document::from_file(path)?;
        self.index_document(&document).await
    }

    /// Access the underlying store
    pub fn store(&self) -> &VectorStore {
        &self.store
    }

    /// Close the owned store handle
    pub fn close(&mut self) -> Result<()> {
        self.store.close()
    }
}
