//! Storage functionality for docdex-rs
//!
//! This module provides the persistent vector store backed by embedded SQLite.

pub mod database;
pub mod schema;

// Re-export main types
pub use database::{StoreStats, VectorStore};
