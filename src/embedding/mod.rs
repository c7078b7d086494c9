//! Embedding provider boundary
//!
//! The engine only depends on the provider contract: given text, return a
//! fixed-length vector. The concrete transport lives behind the trait.

pub mod ollama;

pub use ollama::OllamaEmbedder;

use crate::error::Result;
use crate::similarity::Embedding;
use futures::stream::{self, StreamExt, TryStreamExt};
use std::future::Future;

/// A capability that turns text into a fixed-length numeric vector.
///
/// For a given model the provider must return the same dimensionality on
/// every call; the engine does not re-validate this.
pub trait EmbeddingProvider {
    fn embed(&self, text: &str) -> impl Future<Output = Result<Embedding>> + Send;
}

/// Embed many texts with bounded concurrency, preserving input order.
pub async fn embed_batch<P: EmbeddingProvider>(
    provider: &P,
    texts: &[String],
    concurrency: usize,
) -> Result<Vec<Embedding>> {
    stream::iter(texts.iter().map(|text| provider.embed(text)))
        .buffered(concurrency.max(1))
        .try_collect()
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DocdexError;

    struct LengthEmbedder;

    impl EmbeddingProvider for LengthEmbedder {
        fn embed(&self, text: &str) -> impl Future<Output = Result<Embedding>> + Send {
            let len = text.len() as f32;
            async move { Ok(vec![len, 1.0]) }
        }
    }

    struct FailingEmbedder;

    impl EmbeddingProvider for FailingEmbedder {
        fn embed(&self, _text: &str) -> impl Future<Output = Result<Embedding>> + Send {
            async move { Err(DocdexError::EmbeddingProvider("service down".to_string())) }
        }
    }

    #[tokio::test]
    async fn test_embed_batch_preserves_order() {
        let texts = vec!["a".to_string(), "bbb".to_string(), "cc".to_string()];
        let embeddings = embed_batch(&LengthEmbedder, &texts, 2).await.unwrap();

        assert_eq!(embeddings.len(), 3);
        assert_eq!(embeddings[0][0], 1.0);
        assert_eq!(embeddings[1][0], 3.0);
        assert_eq!(embeddings[2][0], 2.0);
    }

    #[tokio::test]
    async fn test_embed_batch_propagates_failure() {
        let texts = vec!["a".to_string()];
        let result = embed_batch(&FailingEmbedder, &texts, 4).await;
        assert!(matches!(result, Err(DocdexError::EmbeddingProvider(_))));
    }
}
