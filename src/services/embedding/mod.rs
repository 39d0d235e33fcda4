//! Embedding abstraction layer.
//!
//! Chunks and queries must be embedded by the same model; the index records
//! the model id so a mismatched index can be detected on load.

mod http;
mod onnx;

pub use http::HttpEmbedder;
pub use onnx::OnnxEmbedder;

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::{EmbeddingError, ModelError};
use crate::models::{EmbeddingConfig, EmbeddingProvider};

/// Maps text to fixed-length vectors.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed a batch of document chunks, one vector per input, in order.
    async fn embed_documents(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>, EmbeddingError>;

    /// Embed a single search query.
    async fn embed_query(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;

    /// Length of every produced vector.
    fn dimension(&self) -> usize;

    fn model_id(&self) -> &str;
}

pub type SharedEmbedder = Arc<dyn Embedder>;

/// Create an embedder backend based on configuration.
pub fn create_embedder(config: &EmbeddingConfig) -> Result<SharedEmbedder, EmbeddingError> {
    match config.provider {
        EmbeddingProvider::Onnx => {
            let model_dir = config.resolved_model_path().ok_or_else(|| {
                ModelError::NotFound("could not determine models directory".to_string())
            })?;
            Ok(Arc::new(OnnxEmbedder::load(config, &model_dir)?))
        }
        EmbeddingProvider::Http => Ok(Arc::new(HttpEmbedder::new(config)?)),
    }
}

/// Scale a vector to unit length; zero vectors are returned unchanged.
pub fn normalize(v: &[f32]) -> Vec<f32> {
    let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        v.iter().map(|x| x / norm).collect()
    } else {
        v.to_vec()
    }
}
