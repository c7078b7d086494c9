//! DocdexRetriever - Main retrieval API
//!
//! Orchestrates a retrieval call: embed the query, fetch the stored chunks,
//! score, filter by threshold, rank, and truncate to top-K.

use crate::api::context::assemble_context;
use crate::config::RetrievalConfig;
use crate::embedding::EmbeddingProvider;
use crate::error::{DocdexError, Result};
use crate::similarity::cosine_similarity;
use crate::storage::VectorStore;
use crate::text::ChunkRecord;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// A stored chunk paired with its similarity to the query
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    #[serde(flatten)]
    pub chunk: ChunkRecord,

    /// Cosine similarity in [-1, 1]
    pub similarity: f32,
}

/// Retrieval request as consumed by the outer transport layer.
///
/// The wire names match the service this engine replaces.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchRequest {
    pub prompt: String,

    #[serde(rename = "topK", default, skip_serializing_if = "Option::is_none")]
    pub top_k: Option<usize>,

    #[serde(rename = "limiarSimilaridade", default, skip_serializing_if = "Option::is_none")]
    pub threshold: Option<f32>,
}

impl SearchRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            top_k: None,
            threshold: None,
        }
    }
}

/// Retrieval response envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    #[serde(rename = "contexto")]
    pub context: String,

    #[serde(rename = "resultados")]
    pub results: Vec<SearchResult>,
}

/// Main retriever over a long-lived store handle
pub struct DocdexRetriever<P: EmbeddingProvider> {
    store: VectorStore,
    provider: P,
    defaults: RetrievalConfig,
}

impl<P: EmbeddingProvider> DocdexRetriever<P> {
    /// Create a retriever owning the given store handle. The handle lives
    /// for as long as the retriever; call [`close`](Self::close) once at
    /// shutdown.
    pub fn new(store: VectorStore, provider: P, defaults: RetrievalConfig) -> Self {
        Self {
            store,
            provider,
            defaults,
        }
    }

    /// Retrieve the most similar chunks for a query.
    ///
    /// Results at exactly `threshold` are kept; ranking is descending by
    /// similarity with ties left in fetch order; `top_k == 0` yields an
    /// empty set. Any failure along the pipeline surfaces as a
    /// `Retrieval` error wrapping its cause - never as an empty result.
    pub async fn retrieve(
        &self,
        query: &str,
        top_k: usize,
        threshold: f32,
    ) -> Result<Vec<SearchResult>> {
        self.retrieve_inner(query, top_k, threshold)
            .await
            .map_err(DocdexError::retrieval)
    }

    async fn retrieve_inner(
        &self,
        query: &str,
        top_k: usize,
        threshold: f32,
    ) -> Result<Vec<SearchResult>> {
        if top_k == 0 {
            return Ok(Vec::new());
        }

        let query_embedding = self.provider.embed(query).await?;
        let chunks = self.store.fetch_all()?;

        let mut results = chunks
            .into_par_iter()
            .map(|chunk| {
                let embedding = chunk.embedding.as_deref().ok_or_else(|| {
                    DocdexError::CorruptRecord {
                        path: chunk.path.clone(),
                        reason: "missing embedding".to_string(),
                    }
                })?;
                let similarity = cosine_similarity(&query_embedding, embedding)?;
                Ok(SearchResult { chunk, similarity })
            })
            .collect::<Result<Vec<_>>>()?;

        results.retain(|r| r.similarity >= threshold);
        // Stable sort keeps equal scores in fetch order.
        results.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));
        results.truncate(top_k);

        log::info!(
            "Found {} results for query ({} chars) with threshold {}",
            results.len(),
            query.len(),
            threshold
        );
        Ok(results)
    }

    /// Serve a request from the transport layer, applying configured
    /// defaults and assembling the context block.
    pub async fn search(&self, request: SearchRequest) -> Result<SearchResponse> {
        let top_k = request.top_k.unwrap_or(self.defaults.top_k);
        let threshold = request.threshold.unwrap_or(self.defaults.threshold);

        let results = self.retrieve(&request.prompt, top_k, threshold).await?;
        Ok(SearchResponse {
            context: assemble_context(&results),
            results,
        })
    }

    /// Access the underlying store (read-side statistics)
    pub fn store(&self) -> &VectorStore {
        &self.store
    }

    /// Close the owned store handle
    pub fn close(&mut self) -> Result<()> {
        self.store.close()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::similarity::Embedding;
    use std::future::Future;

    struct FixedEmbedder(Embedding);

    impl EmbeddingProvider for FixedEmbedder {
        fn embed(&self, _text: &str) -> impl Future<Output = Result<Embedding>> + Send {
            let vector = self.0.clone();
            async move { Ok(vector) }
        }
    }

    struct FailingEmbedder;

    impl EmbeddingProvider for FailingEmbedder {
        fn embed(&self, _text: &str) -> impl Future<Output = Result<Embedding>> + Send {
            async move { Err(DocdexError::EmbeddingProvider("service down".to_string())) }
        }
    }

    fn chunk(name: &str, embedding: Embedding) -> ChunkRecord {
        ChunkRecord {
            name: name.to_string(),
            path: format!("/docs/{}#chunk-1", name),
            content: format!("content of {}", name),
            embedding: Some(embedding),
            indexed_at: None,
        }
    }

    /// Store with similarities 0.9, 0.5 (exactly), and 0.3 against the
    /// unit query [1, 0, 0, 0]. The 0.5 fixture uses [0.5; 4], whose norm
    /// is exactly 1.0, so the boundary case is not subject to rounding.
    fn seeded_store() -> VectorStore {
        let mut store = VectorStore::memory().unwrap();
        store
            .bulk_upsert(&[
                chunk("high", vec![0.9, 0.435_889_9, 0.0, 0.0]),
                chunk("exact", vec![0.5, 0.5, 0.5, 0.5]),
                chunk("low", vec![0.3, 0.953_939_2, 0.0, 0.0]),
            ])
            .unwrap();
        store
    }

    fn query_embedder() -> FixedEmbedder {
        FixedEmbedder(vec![1.0, 0.0, 0.0, 0.0])
    }

    #[tokio::test]
    async fn test_threshold_boundary_is_inclusive() {
        let retriever =
            DocdexRetriever::new(seeded_store(), query_embedder(), RetrievalConfig::default());

        let results = retriever.retrieve("q", 3, 0.5).await.unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].chunk.name, "high");
        assert_eq!(results[1].chunk.name, "exact");
        assert_eq!(results[1].similarity, 0.5);
    }

    #[tokio::test]
    async fn test_top_k_truncation() {
        let retriever =
            DocdexRetriever::new(seeded_store(), query_embedder(), RetrievalConfig::default());

        let results = retriever.retrieve("q", 1, 0.0).await.unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].chunk.name, "high");
    }

    #[tokio::test]
    async fn test_top_k_zero_returns_empty() {
        let retriever =
            DocdexRetriever::new(seeded_store(), query_embedder(), RetrievalConfig::default());

        let results = retriever.retrieve("q", 0, 0.0).await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_provider_failure_surfaces_as_retrieval_error() {
        let retriever =
            DocdexRetriever::new(seeded_store(), FailingEmbedder, RetrievalConfig::default());

        match retriever.retrieve("q", 3, 0.5).await {
            Err(DocdexError::Retrieval(cause)) => {
                assert!(matches!(*cause, DocdexError::EmbeddingProvider(_)));
            }
            other => panic!("Expected Retrieval error, got {:?}", other.map(|v| v.len())),
        }
    }

    #[tokio::test]
    async fn test_dimension_mismatch_surfaces_as_retrieval_error() {
        let mut store = VectorStore::memory().unwrap();
        store.bulk_upsert(&[chunk("short", vec![1.0, 0.0])]).unwrap();

        let retriever = DocdexRetriever::new(store, query_embedder(), RetrievalConfig::default());

        match retriever.retrieve("q", 3, 0.0).await {
            Err(DocdexError::Retrieval(cause)) => {
                assert!(matches!(*cause, DocdexError::DimensionMismatch { .. }));
            }
            other => panic!("Expected Retrieval error, got {:?}", other.map(|v| v.len())),
        }
    }

    #[tokio::test]
    async fn test_retrieval_does_not_mutate_the_store() {
        let retriever =
            DocdexRetriever::new(seeded_store(), query_embedder(), RetrievalConfig::default());

        let before = retriever.store().count().unwrap();
        retriever.retrieve("q", 3, 0.0).await.unwrap();
        assert_eq!(retriever.store().count().unwrap(), before);
    }

    #[tokio::test]
    async fn test_search_applies_defaults_and_assembles_context() {
        let retriever =
            DocdexRetriever::new(seeded_store(), query_embedder(), RetrievalConfig::default());

        let response = retriever.search(SearchRequest::new("q")).await.unwrap();

        // Defaults: top_k = 3, threshold = 0.5
        assert_eq!(response.results.len(), 2);
        assert!(response.context.contains("high"));
        assert!(response.context.contains("(similarity: 0.90)"));
    }
}
