//! Configuration for docdex-rs
//!
//! All components receive their configuration explicitly at construction
//! time; nothing in the library reads the process environment.

use crate::error::{DocdexError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Top-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Location of the SQLite vector store
    pub store_path: PathBuf,

    /// Embedding provider settings
    pub embedding: EmbeddingConfig,

    /// Chunking settings
    pub chunking: ChunkingConfig,

    /// Retrieval defaults
    pub retrieval: RetrievalConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store_path: PathBuf::from("docdex.db"),
            embedding: EmbeddingConfig::default(),
            chunking: ChunkingConfig::default(),
            retrieval: RetrievalConfig::default(),
        }
    }
}

impl Config {
    /// Validate the configuration. Only "non-empty" is enforced here;
    /// reachability of the provider is discovered at call time.
    pub fn validate(&self) -> Result<()> {
        if self.store_path.as_os_str().is_empty() {
            return Err(DocdexError::Config("store path must not be empty".to_string()));
        }
        self.embedding.validate()
    }
}

/// Embedding provider settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// Base URL of the embedding service
    pub base_url: String,

    /// Model identifier passed with every request
    pub model: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".to_string(),
            model: "nomic-embed-text".to_string(),
            timeout_secs: 30,
        }
    }
}

impl EmbeddingConfig {
    pub fn validate(&self) -> Result<()> {
        if self.base_url.trim().is_empty() {
            return Err(DocdexError::Config(
                "embedding base URL must not be empty".to_string(),
            ));
        }
        if self.model.trim().is_empty() {
            return Err(DocdexError::Config(
                "embedding model must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Chunking settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkingConfig {
    /// Maximum chunk size in characters
    pub max_chunk_size: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            max_chunk_size: 2000,
        }
    }
}

/// Retrieval defaults, applied when a request leaves them unset
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Number of results to return
    pub top_k: usize,

    /// Minimum similarity for a result to be considered relevant
    pub threshold: f32,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: 3,
            threshold: 0.5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.chunking.max_chunk_size, 2000);
        assert_eq!(config.retrieval.top_k, 3);
        assert_eq!(config.retrieval.threshold, 0.5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_base_url_rejected() {
        let mut config = Config::default();
        config.embedding.base_url = "  ".to_string();
        assert!(matches!(config.validate(), Err(DocdexError::Config(_))));
    }

    #[test]
    fn test_empty_model_rejected() {
        let mut config = Config::default();
        config.embedding.model = String::new();
        assert!(matches!(config.validate(), Err(DocdexError::Config(_))));
    }
}
