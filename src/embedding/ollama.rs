//! Ollama embedding client
//!
//! Speaks the Ollama embeddings protocol: `POST {base}/api/embeddings` with
//! a model and prompt, returning a single embedding vector.

use crate::config::EmbeddingConfig;
use crate::embedding::EmbeddingProvider;
use crate::error::{DocdexError, Result};
use crate::similarity::Embedding;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;

#[derive(Serialize)]
struct EmbeddingsRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Deserialize)]
struct EmbeddingsResponse {
    embedding: Embedding,
}

/// HTTP embedding provider backed by an Ollama-compatible service
pub struct OllamaEmbedder {
    client: reqwest::Client,
    base_url: String,
    model: String,
}

impl OllamaEmbedder {
    /// Create a client for the configured service. The timeout bounds the
    /// single suspend point each retrieval has on the provider.
    pub fn new(config: &EmbeddingConfig) -> Result<Self> {
        config.validate()?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| DocdexError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/api/embeddings", self.base_url)
    }

    async fn request_embedding(&self, text: &str) -> Result<Embedding> {
        let url = self.endpoint();
        let response = self
            .client
            .post(&url)
            .json(&EmbeddingsRequest {
                model: &self.model,
                prompt: text,
            })
            .send()
            .await
            .map_err(|e| DocdexError::EmbeddingProvider(format!("Request to {} failed: {}", url, e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DocdexError::EmbeddingProvider(format!(
                "Embedding service returned {}: {}",
                status,
                body.trim()
            )));
        }

        let parsed: EmbeddingsResponse = response
            .json()
            .await
            .map_err(|e| DocdexError::EmbeddingProvider(format!("Malformed embedding response: {}", e)))?;

        if parsed.embedding.is_empty() {
            return Err(DocdexError::EmbeddingProvider(
                "Embedding service returned an empty vector".to_string(),
            ));
        }

        log::debug!("Embedded {} chars into {} dimensions", text.len(), parsed.embedding.len());
        Ok(parsed.embedding)
    }
}

impl EmbeddingProvider for OllamaEmbedder {
    fn embed(&self, text: &str) -> impl Future<Output = Result<Embedding>> + Send {
        self.request_embedding(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_model_is_rejected() {
        let config = EmbeddingConfig {
            model: String::new(),
            ..EmbeddingConfig::default()
        };
        assert!(matches!(OllamaEmbedder::new(&config), Err(DocdexError::Config(_))));
    }

    #[test]
    fn test_endpoint_handles_trailing_slash() {
        let config = EmbeddingConfig {
            base_url: "http://localhost:11434/".to_string(),
            ..EmbeddingConfig::default()
        };
        let embedder = OllamaEmbedder::new(&config).unwrap();
        assert_eq!(embedder.endpoint(), "http://localhost:11434/api/embeddings");
    }
}
