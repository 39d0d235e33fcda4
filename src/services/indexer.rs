//! Vectorstore builder: PDF folder -> chunks -> embeddings -> persisted index.

use std::path::PathBuf;

use chrono::Utc;
use indicatif::ProgressBar;
use tracing::info;

use crate::error::IndexError;
use crate::models::{Config, DocumentChunk, IndexingConfig};
use crate::services::chunker::TextChunker;
use crate::services::embedding::{Embedder, SharedEmbedder};
use crate::services::loader::PdfLoader;
use crate::services::vector_index::{IndexManifest, VectorIndex};

/// Rebuilds the vector index from scratch on every call.
pub struct IndexBuilder {
    loader: PdfLoader,
    chunker: TextChunker,
    indexing: IndexingConfig,
    embedder: SharedEmbedder,
    index_path: PathBuf,
    batch_size: usize,
    progress: ProgressBar,
}

impl IndexBuilder {
    pub fn new(config: &Config, embedder: SharedEmbedder) -> Self {
        Self {
            loader: PdfLoader::new(&config.documents.folder),
            chunker: TextChunker::new(&config.indexing),
            indexing: config.indexing.clone(),
            embedder,
            index_path: config.index.path.clone(),
            batch_size: config.embedding.batch_size.max(1) as usize,
            progress: ProgressBar::hidden(),
        }
    }

    /// Report embedding progress (one tick per chunk) on the given bar.
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = progress;
        self
    }

    /// Load, chunk, embed and persist. Any unreadable PDF aborts the build.
    pub async fn build(&self) -> Result<VectorIndex, IndexError> {
        info!(folder = %self.loader.folder().display(), "loading PDFs");
        let documents = self.loader.load()?;

        let mut sources: Vec<String> = documents
            .iter()
            .map(|d| d.metadata.source.clone())
            .collect();
        sources.dedup();

        let chunks = self.chunker.chunk_all(&documents);
        info!(
            documents = documents.len(),
            chunks = chunks.len(),
            "documents loaded, splitting and embedding"
        );

        let mut index = VectorIndex::new(IndexManifest {
            model_id: self.embedder.model_id().to_string(),
            dimension: self.embedder.dimension(),
            chunk_size: self.indexing.chunk_size,
            chunk_overlap: self.indexing.chunk_overlap,
            built_at: Utc::now(),
            sources,
        });

        self.progress.set_length(chunks.len() as u64);
        for batch in chunks.chunks(self.batch_size) {
            process_batch(self.embedder.as_ref(), &mut index, batch.to_vec()).await?;
            self.progress.inc(batch.len() as u64);
        }
        self.progress.finish_and_clear();

        index.save(&self.index_path)?;
        info!(
            path = %self.index_path.display(),
            entries = index.len(),
            "vector index built"
        );

        Ok(index)
    }
}

/// Embed one batch of chunks and append them to the index.
pub async fn process_batch(
    embedder: &dyn Embedder,
    index: &mut VectorIndex,
    chunks: Vec<DocumentChunk>,
) -> Result<(), IndexError> {
    if chunks.is_empty() {
        return Ok(());
    }

    let texts: Vec<String> = chunks.iter().map(|c| c.content.clone()).collect();
    let embeddings = embedder.embed_documents(texts).await?;

    if embeddings.len() != chunks.len() {
        return Err(IndexError::EmbeddingCountMismatch {
            expected: chunks.len(),
            actual: embeddings.len(),
        });
    }

    for (chunk, embedding) in chunks.into_iter().zip(embeddings) {
        index.add(chunk.into(), &embedding)?;
    }

    Ok(())
}
