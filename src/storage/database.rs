//! SQLite-backed vector store
//!
//! Durable mapping from a chunk's unique path to its text and embedding.
//! One long-lived handle owns the underlying connection; WAL mode lets
//! concurrent readers run against it while a batch commits.

use crate::error::{DocdexError, Result};
use crate::storage::schema::*;
use crate::text::ChunkRecord;
use chrono::{DateTime, Utc};
use rusqlite::{Connection, params};
use std::path::Path;

/// Vector store connection and operations
pub struct VectorStore {
    conn: Option<Connection>,
}

impl VectorStore {
    /// Open (or create) a store at the given path
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)
            .map_err(|e| DocdexError::Persistence(format!("Failed to open store: {}", e)))?;

        let mut store = Self { conn: Some(conn) };
        store.initialize()?;
        Ok(store)
    }

    /// Create an in-memory store (for testing)
    pub fn memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|e| {
            DocdexError::Persistence(format!("Failed to create in-memory store: {}", e))
        })?;

        let mut store = Self { conn: Some(conn) };
        store.initialize()?;
        Ok(store)
    }

    /// Initialize the schema. Safe to run against a store that already
    /// contains data.
    fn initialize(&mut self) -> Result<()> {
        let conn = self.conn()?;

        // Enable WAL mode for better concurrency
        let _: String = conn
            .query_row("PRAGMA journal_mode=WAL", [], |row| row.get(0))
            .map_err(|e| DocdexError::Persistence(format!("Failed to enable WAL mode: {}", e)))?;

        conn.execute(CREATE_DOCUMENTS_TABLE, [])
            .map_err(|e| DocdexError::Persistence(format!("Failed to create documents table: {}", e)))?;

        conn.execute(CREATE_METADATA_TABLE, [])
            .map_err(|e| DocdexError::Persistence(format!("Failed to create metadata table: {}", e)))?;

        conn.execute(CREATE_DOCUMENTS_INDEXES, [])
            .map_err(|e| DocdexError::Persistence(format!("Failed to create indexes: {}", e)))?;

        conn.execute(
            "INSERT OR REPLACE INTO metadata (key, value) VALUES ('schema_version', ?)",
            params![SCHEMA_VERSION.to_string()],
        )
        .map_err(|e| DocdexError::Persistence(format!("Failed to set schema version: {}", e)))?;

        log::info!("Vector store initialized with schema version {}", SCHEMA_VERSION);
        Ok(())
    }

    /// Insert a chunk, or replace the existing record with the same path.
    /// `indexed_at` is assigned here, not by the caller.
    pub fn upsert(&self, chunk: &ChunkRecord) -> Result<()> {
        let conn = self.conn()?;
        let (embedding, indexed_at) = Self::encode(chunk)?;

        conn.execute(
            r#"
            INSERT INTO documents (name, path, content, embedding, indexed_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT(path) DO UPDATE SET
                name = excluded.name,
                content = excluded.content,
                embedding = excluded.embedding,
                indexed_at = excluded.indexed_at
            "#,
            params![chunk.name, chunk.path, chunk.content, embedding, indexed_at],
        )
        .map_err(|e| DocdexError::Persistence(format!("Failed to upsert chunk '{}': {}", chunk.path, e)))?;

        Ok(())
    }

    /// Apply all upserts as one atomic unit. A failure partway rolls back
    /// every write in the batch.
    pub fn bulk_upsert(&mut self, chunks: &[ChunkRecord]) -> Result<()> {
        let conn = self.conn.as_mut().ok_or(DocdexError::ClosedStore)?;
        let tx = conn
            .transaction()
            .map_err(|e| DocdexError::Persistence(format!("Failed to start transaction: {}", e)))?;

        {
            let mut stmt = tx
                .prepare(
                    r#"
                    INSERT INTO documents (name, path, content, embedding, indexed_at)
                    VALUES (?1, ?2, ?3, ?4, ?5)
                    ON CONFLICT(path) DO UPDATE SET
                        name = excluded.name,
                        content = excluded.content,
                        embedding = excluded.embedding,
                        indexed_at = excluded.indexed_at
                    "#,
                )
                .map_err(|e| DocdexError::Persistence(format!("Failed to prepare statement: {}", e)))?;

            for chunk in chunks {
                let (embedding, indexed_at) = Self::encode(chunk)?;
                stmt.execute(params![chunk.name, chunk.path, chunk.content, embedding, indexed_at])
                    .map_err(|e| {
                        DocdexError::Persistence(format!("Failed to insert chunk '{}': {}", chunk.path, e))
                    })?;
            }
        }

        tx.commit()
            .map_err(|e| DocdexError::Persistence(format!("Failed to commit transaction: {}", e)))?;

        log::info!("Inserted {} chunks into vector store", chunks.len());
        Ok(())
    }

    /// Return every stored record with embeddings decoded.
    ///
    /// A record whose embedding or timestamp cannot be decoded fails the
    /// whole call: retrieval ranking depends on scoring the complete set.
    pub fn fetch_all(&self) -> Result<Vec<ChunkRecord>> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare("SELECT name, path, content, embedding, indexed_at FROM documents")
            .map_err(|e| DocdexError::Persistence(format!("Failed to prepare query: {}", e)))?;

        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(4)?,
                ))
            })
            .map_err(|e| DocdexError::Persistence(format!("Failed to query chunks: {}", e)))?;

        let mut chunks = Vec::new();
        for row in rows {
            let (name, path, content, embedding_json, indexed_at_text) =
                row.map_err(|e| DocdexError::Persistence(format!("Failed to read row: {}", e)))?;

            let embedding: Vec<f32> =
                serde_json::from_str(&embedding_json).map_err(|e| DocdexError::CorruptRecord {
                    path: path.clone(),
                    reason: format!("unreadable embedding: {}", e),
                })?;

            let indexed_at = DateTime::parse_from_rfc3339(&indexed_at_text)
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|e| DocdexError::CorruptRecord {
                    path: path.clone(),
                    reason: format!("unreadable timestamp: {}", e),
                })?;

            chunks.push(ChunkRecord {
                name,
                path,
                content,
                embedding: Some(embedding),
                indexed_at: Some(indexed_at),
            });
        }

        Ok(chunks)
    }

    /// Number of stored records
    pub fn count(&self) -> Result<usize> {
        let count: i64 = self
            .conn()?
            .query_row("SELECT COUNT(*) FROM documents", [], |row| row.get(0))
            .map_err(|e| DocdexError::Persistence(format!("Failed to count chunks: {}", e)))?;

        Ok(count as usize)
    }

    /// Delete all records. Irreversible.
    pub fn clear(&self) -> Result<()> {
        let deleted = self
            .conn()?
            .execute("DELETE FROM documents", [])
            .map_err(|e| DocdexError::Persistence(format!("Failed to clear store: {}", e)))?;

        log::info!("Cleared vector store ({} records removed)", deleted);
        Ok(())
    }

    /// Release the underlying connection. Must be called exactly once; any
    /// operation after it fails with `ClosedStore`.
    pub fn close(&mut self) -> Result<()> {
        match self.conn.take() {
            Some(conn) => conn.close().map_err(|(_, e)| DocdexError::Database(e)),
            None => Err(DocdexError::ClosedStore),
        }
    }

    /// Get store statistics
    pub fn stats(&self) -> Result<StoreStats> {
        let chunk_count = self.count()?;

        let file_size: i64 = self
            .conn()?
            .query_row(
                "SELECT page_count * page_size FROM pragma_page_count(), pragma_page_size()",
                [],
                |row| row.get(0),
            )
            .map_err(|e| DocdexError::Persistence(format!("Failed to get store size: {}", e)))?;

        Ok(StoreStats {
            chunk_count,
            file_size_bytes: file_size as usize,
        })
    }

    fn conn(&self) -> Result<&Connection> {
        self.conn.as_ref().ok_or(DocdexError::ClosedStore)
    }

    /// Serialize the write-time columns of a chunk
    fn encode(chunk: &ChunkRecord) -> Result<(String, String)> {
        let embedding = chunk.embedding.as_ref().ok_or_else(|| {
            DocdexError::Persistence(format!("Chunk '{}' has no embedding", chunk.path))
        })?;

        Ok((serde_json::to_string(embedding)?, Utc::now().to_rfc3339()))
    }
}

/// Store statistics
#[derive(Debug, Clone)]
pub struct StoreStats {
    pub chunk_count: usize,
    pub file_size_bytes: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(tag: &str) -> ChunkRecord {
        ChunkRecord {
            name: format!("{}_chunk_1", tag),
            path: format!("/docs/{}#chunk-1", tag),
            content: format!("content of {}", tag),
            embedding: Some(vec![0.1, 0.2, 0.3]),
            indexed_at: None,
        }
    }

    #[test]
    fn test_upsert_and_count() {
        let store = VectorStore::memory().unwrap();
        store.upsert(&record("a")).unwrap();
        store.upsert(&record("b")).unwrap();
        assert_eq!(store.count().unwrap(), 2);
    }

    #[test]
    fn test_upsert_is_idempotent_on_path() {
        let store = VectorStore::memory().unwrap();
        let chunk = record("a");
        store.upsert(&chunk).unwrap();
        store.upsert(&chunk).unwrap();
        assert_eq!(store.count().unwrap(), 1);
    }

    #[test]
    fn test_upsert_replaces_record_with_same_path() {
        let store = VectorStore::memory().unwrap();
        let mut chunk = record("a");
        store.upsert(&chunk).unwrap();

        chunk.content = "rewritten".to_string();
        chunk.embedding = Some(vec![0.9, 0.9, 0.9]);
        store.upsert(&chunk).unwrap();

        assert_eq!(store.count().unwrap(), 1);
        let fetched = store.fetch_all().unwrap();
        assert_eq!(fetched[0].content, "rewritten");
        assert_eq!(fetched[0].embedding, Some(vec![0.9, 0.9, 0.9]));
    }

    #[test]
    fn test_store_assigns_indexed_at() {
        let store = VectorStore::memory().unwrap();
        store.upsert(&record("a")).unwrap();

        let fetched = store.fetch_all().unwrap();
        assert!(fetched[0].indexed_at.is_some());
    }

    #[test]
    fn test_bulk_upsert_makes_all_chunks_visible() {
        let mut store = VectorStore::memory().unwrap();
        let batch = vec![record("a"), record("b"), record("c")];
        store.bulk_upsert(&batch).unwrap();

        assert_eq!(store.count().unwrap(), 3);
        let fetched = store.fetch_all().unwrap();
        assert!(fetched.iter().all(|c| c.embedding.is_some()));
    }

    #[test]
    fn test_bulk_upsert_rolls_back_on_mid_batch_failure() {
        let mut store = VectorStore::memory().unwrap();

        // Cap the page budget so the oversized final record hits
        // SQLITE_FULL inside the transaction.
        {
            let conn = store.conn.as_ref().unwrap();
            let pages: i64 = conn.query_row("PRAGMA page_count", [], |r| r.get(0)).unwrap();
            let _: i64 = conn
                .query_row(&format!("PRAGMA max_page_count = {}", pages + 2), [], |r| r.get(0))
                .unwrap();
        }

        let mut oversized = record("d");
        oversized.content = "x".repeat(1 << 20);
        let batch = vec![record("a"), record("b"), record("c"), oversized];

        assert!(store.bulk_upsert(&batch).is_err());
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn test_missing_embedding_is_rejected() {
        let store = VectorStore::memory().unwrap();
        let mut chunk = record("a");
        chunk.embedding = None;

        assert!(matches!(store.upsert(&chunk), Err(DocdexError::Persistence(_))));
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn test_fetch_all_fails_on_corrupt_embedding() {
        let store = VectorStore::memory().unwrap();
        store.upsert(&record("a")).unwrap();

        store
            .conn
            .as_ref()
            .unwrap()
            .execute(
                "INSERT INTO documents (name, path, content, embedding, indexed_at)
                 VALUES ('bad', '/docs/bad#chunk-1', 'text', 'not-json', ?1)",
                params![Utc::now().to_rfc3339()],
            )
            .unwrap();

        match store.fetch_all() {
            Err(DocdexError::CorruptRecord { path, .. }) => {
                assert_eq!(path, "/docs/bad#chunk-1");
            }
            other => panic!("Expected CorruptRecord, got {:?}", other.map(|v| v.len())),
        }
    }

    #[test]
    fn test_clear_removes_everything() {
        let store = VectorStore::memory().unwrap();
        store.upsert(&record("a")).unwrap();
        store.upsert(&record("b")).unwrap();

        store.clear().unwrap();
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn test_operations_after_close_fail() {
        let mut store = VectorStore::memory().unwrap();
        store.upsert(&record("a")).unwrap();

        store.close().unwrap();

        assert!(matches!(store.count(), Err(DocdexError::ClosedStore)));
        assert!(matches!(store.fetch_all(), Err(DocdexError::ClosedStore)));
        assert!(matches!(store.upsert(&record("b")), Err(DocdexError::ClosedStore)));
        assert!(matches!(store.close(), Err(DocdexError::ClosedStore)));
    }

    #[test]
    fn test_initialization_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.db");

        {
            let mut store = VectorStore::open(&path).unwrap();
            store.upsert(&record("a")).unwrap();
            store.close().unwrap();
        }

        // Re-opening runs initialize() again without touching existing data.
        let store = VectorStore::open(&path).unwrap();
        assert_eq!(store.count().unwrap(), 1);
    }

    #[test]
    fn test_stats() {
        let store = VectorStore::memory().unwrap();
        store.upsert(&record("a")).unwrap();

        let stats = store.stats().unwrap();
        assert_eq!(stats.chunk_count, 1);
        assert!(stats.file_size_bytes > 0);
    }
}
