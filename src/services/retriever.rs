//! Similarity retrieval over the persisted vector index.

use std::sync::Arc;

use tracing::debug;

use crate::error::RetrievalError;
use crate::services::embedding::SharedEmbedder;
use crate::services::vector_index::{ScoredChunk, VectorIndex};

/// Embeds queries with the build-time model and searches the index.
#[derive(Clone)]
pub struct Retriever {
    index: Arc<VectorIndex>,
    embedder: SharedEmbedder,
}

impl Retriever {
    pub fn new(index: Arc<VectorIndex>, embedder: SharedEmbedder) -> Self {
        Self { index, embedder }
    }

    pub fn index(&self) -> &VectorIndex {
        &self.index
    }

    /// Top-`k` chunks by descending similarity. No relevance threshold is
    /// applied and overlapping chunks are not merged.
    pub async fn search(&self, query: &str, k: usize) -> Result<Vec<ScoredChunk>, RetrievalError> {
        if self.index.is_empty() || k == 0 {
            return Ok(Vec::new());
        }

        let vector = self.embedder.embed_query(query).await?;
        let hits = self.index.search(&vector, k)?;
        debug!(k, hits = hits.len(), "retrieved context chunks");
        Ok(hits)
    }

    /// Chunk texts of [`search`](Self::search), newline-joined.
    /// An empty index yields an empty string.
    pub async fn retrieve(&self, query: &str, k: usize) -> Result<String, RetrievalError> {
        let hits = self.search(query, k).await?;
        Ok(hits
            .into_iter()
            .map(|hit| hit.chunk.content)
            .collect::<Vec<_>>()
            .join("\n"))
    }
}
