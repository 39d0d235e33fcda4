//! Flat cosine-similarity index over chunk embeddings, persisted to a directory.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use ndarray::{ArrayView1, ArrayView2};
use serde::{Deserialize, Serialize};

use crate::error::VectorIndexError;
use crate::models::DocumentChunk;
use crate::services::embedding::normalize;

const INDEX_FILE: &str = "index.json";

/// Build information stored alongside the vectors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexManifest {
    pub model_id: String,
    pub dimension: usize,
    pub chunk_size: u32,
    pub chunk_overlap: u32,
    pub built_at: DateTime<Utc>,
    pub sources: Vec<String>,
}

/// Text and provenance of one indexed chunk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexedChunk {
    pub id: String,
    pub content: String,
    pub source: String,
    pub page: u32,
}

impl From<DocumentChunk> for IndexedChunk {
    fn from(chunk: DocumentChunk) -> Self {
        Self {
            id: chunk.id,
            content: chunk.content,
            source: chunk.source,
            page: chunk.page,
        }
    }
}

/// A search hit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredChunk {
    /// Cosine similarity in [-1, 1]
    pub score: f32,
    pub chunk: IndexedChunk,
}

#[derive(Debug, Serialize, Deserialize)]
struct IndexFile {
    manifest: IndexManifest,
    chunks: Vec<IndexedChunk>,
    /// Row-major `chunks.len() x dimension` matrix of unit vectors
    vectors: Vec<f32>,
}

/// Append-only during a build, read-only afterwards.
#[derive(Debug, Clone)]
pub struct VectorIndex {
    manifest: IndexManifest,
    chunks: Vec<IndexedChunk>,
    vectors: Vec<f32>,
}

impl VectorIndex {
    pub fn new(manifest: IndexManifest) -> Self {
        Self {
            manifest,
            chunks: Vec::new(),
            vectors: Vec::new(),
        }
    }

    pub fn manifest(&self) -> &IndexManifest {
        &self.manifest
    }

    pub fn dimension(&self) -> usize {
        self.manifest.dimension
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Append a chunk with its embedding. The vector is stored normalised.
    pub fn add(&mut self, chunk: IndexedChunk, vector: &[f32]) -> Result<(), VectorIndexError> {
        if vector.len() != self.manifest.dimension {
            return Err(VectorIndexError::DimensionMismatch {
                expected: self.manifest.dimension,
                actual: vector.len(),
            });
        }
        self.vectors.extend(normalize(vector));
        self.chunks.push(chunk);
        Ok(())
    }

    /// Return up to `k` chunks ordered by descending cosine similarity.
    /// Equal scores keep insertion order.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<ScoredChunk>, VectorIndexError> {
        if self.is_empty() || k == 0 {
            return Ok(Vec::new());
        }
        if query.len() != self.manifest.dimension {
            return Err(VectorIndexError::DimensionMismatch {
                expected: self.manifest.dimension,
                actual: query.len(),
            });
        }

        let shape = (self.chunks.len(), self.dimension());
        let matrix = ArrayView2::from_shape(shape, self.vectors.as_slice())
            .map_err(|e| VectorIndexError::Corrupt(e.to_string()))?;
        let query = normalize(query);
        let scores = matrix.dot(&ArrayView1::from(&query));

        let mut ranked: Vec<(usize, f32)> = scores.iter().copied().enumerate().collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));

        Ok(ranked
            .into_iter()
            .take(k)
            .map(|(idx, score)| ScoredChunk {
                score,
                chunk: self.chunks[idx].clone(),
            })
            .collect())
    }

    pub fn index_file(dir: &Path) -> PathBuf {
        dir.join(INDEX_FILE)
    }

    /// Write the index into `dir`, replacing any previous index there.
    pub fn save(&self, dir: &Path) -> Result<(), VectorIndexError> {
        std::fs::create_dir_all(dir)?;

        let file = IndexFile {
            manifest: self.manifest.clone(),
            chunks: self.chunks.clone(),
            vectors: self.vectors.clone(),
        };

        let path = Self::index_file(dir);
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, serde_json::to_vec(&file)?)?;
        std::fs::rename(&tmp, &path)?;
        Ok(())
    }

    pub fn load(dir: &Path) -> Result<Self, VectorIndexError> {
        let path = Self::index_file(dir);
        if !path.exists() {
            return Err(VectorIndexError::NotFound(dir.to_path_buf()));
        }

        let bytes = std::fs::read(&path)?;
        let file: IndexFile = serde_json::from_slice(&bytes)?;

        if file.vectors.len() != file.chunks.len() * file.manifest.dimension {
            return Err(VectorIndexError::Corrupt(format!(
                "{} vector values for {} chunks of dimension {}",
                file.vectors.len(),
                file.chunks.len(),
                file.manifest.dimension
            )));
        }

        Ok(Self {
            manifest: file.manifest,
            chunks: file.chunks,
            vectors: file.vectors,
        })
    }
}
