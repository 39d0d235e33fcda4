//! Embedding client for a remote text-embeddings server.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use super::Embedder;
use crate::error::EmbeddingError;
use crate::models::EmbeddingConfig;

/// Request body for the /embed endpoint.
#[derive(Debug, Serialize)]
struct EmbedRequest {
    inputs: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    truncate: Option<bool>,
}

/// Response from the /embed endpoint.
#[derive(Debug, Deserialize)]
struct EmbedResponse(Vec<Vec<f32>>);

/// Client for a server exposing `POST /embed` (text-embeddings-inference style).
#[derive(Debug, Clone)]
pub struct HttpEmbedder {
    client: Client,
    base_url: String,
    model_id: String,
    dimension: usize,
    batch_size: usize,
}

impl HttpEmbedder {
    /// Create a new embedding client with the given configuration.
    pub fn new(config: &EmbeddingConfig) -> Result<Self, EmbeddingError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| EmbeddingError::ConnectionError(e.to_string()))?;

        let base_url = config.url.trim_end_matches('/').to_string();
        debug!(url = %base_url, model = %config.model_id, "embedding server configured");

        Ok(Self {
            client,
            base_url,
            model_id: config.model_id.clone(),
            dimension: config.dimension as usize,
            batch_size: config.batch_size.max(1) as usize,
        })
    }

    /// Internal method to embed a single batch.
    async fn embed_single_batch(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        let url = format!("{}/embed", self.base_url);
        let request = EmbedRequest {
            inputs: texts,
            truncate: Some(true),
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    EmbeddingError::Timeout
                } else if e.is_connect() {
                    EmbeddingError::ConnectionError(e.to_string())
                } else {
                    EmbeddingError::RequestError(e)
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(EmbeddingError::ServerError(format!(
                "status {}: {}",
                status, body
            )));
        }

        let embed_response: EmbedResponse = response
            .json()
            .await
            .map_err(|e| EmbeddingError::InvalidResponse(e.to_string()))?;

        if let Some(actual) = embed_response
            .0
            .iter()
            .map(Vec::len)
            .find(|&len| len != self.dimension)
        {
            return Err(EmbeddingError::DimensionMismatch {
                expected: self.dimension,
                actual,
            });
        }

        Ok(embed_response.0)
    }
}

#[async_trait]
impl Embedder for HttpEmbedder {
    async fn embed_documents(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let mut all_embeddings = Vec::with_capacity(texts.len());
        for chunk in texts.chunks(self.batch_size) {
            let embeddings = self.embed_single_batch(chunk.to_vec()).await?;
            all_embeddings.extend(embeddings);
        }

        Ok(all_embeddings)
    }

    async fn embed_query(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        self.embed_single_batch(vec![text.to_string()])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| EmbeddingError::InvalidResponse("empty embedding response".to_string()))
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let config = EmbeddingConfig::default();
        let client = HttpEmbedder::new(&config);
        assert!(client.is_ok());
    }

    #[test]
    fn test_base_url_trimming() {
        let config = EmbeddingConfig {
            url: "http://localhost:11411/".to_string(),
            ..Default::default()
        };
        let client = HttpEmbedder::new(&config).unwrap();
        assert_eq!(client.base_url, "http://localhost:11411");
    }

    #[tokio::test]
    async fn test_empty_input_skips_request() {
        let config = EmbeddingConfig {
            url: "http://127.0.0.1:9".to_string(),
            ..Default::default()
        };
        let client = HttpEmbedder::new(&config).unwrap();
        assert!(client.embed_documents(Vec::new()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_connection_refused() {
        let config = EmbeddingConfig {
            url: "http://127.0.0.1:9".to_string(),
            ..Default::default()
        };
        let client = HttpEmbedder::new(&config).unwrap();
        let err = client.embed_query("hello").await.unwrap_err();
        assert!(matches!(
            err,
            EmbeddingError::ConnectionError(_) | EmbeddingError::RequestError(_)
        ));
    }
}
