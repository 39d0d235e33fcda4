use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use ndarray::ArrayViewD;
use ort::session::{Session, builder::GraphOptimizationLevel};
use ort::value::Tensor;
use tokenizers::Tokenizer;
use tokenizers::{PaddingParams, PaddingStrategy, TruncationParams, TruncationStrategy};
use tracing::info;

use super::{Embedder, normalize};
use crate::error::{EmbeddingError, ModelError};
use crate::models::EmbeddingConfig;

/// Sentence-transformer model run in-process through ONNX Runtime.
///
/// Expects `model.onnx` and `tokenizer.json` in the model directory and
/// produces mean-pooled, L2-normalised sentence vectors.
pub struct OnnxEmbedder {
    model: Arc<OnnxModel>,
    model_id: String,
    batch_size: usize,
}

/// Session and tokenizer, shared with the blocking pool during inference.
struct OnnxModel {
    session: Mutex<Session>,
    tokenizer: Tokenizer,
    dimension: usize,
}

impl OnnxEmbedder {
    pub fn load(config: &EmbeddingConfig, model_dir: &Path) -> Result<Self, ModelError> {
        let model_path = model_dir.join("model.onnx");
        let tokenizer_path = model_dir.join("tokenizer.json");
        let max_tokens = config.max_tokens as usize;

        if !model_path.exists() {
            return Err(ModelError::NotFound(format!(
                "model not found: {}",
                model_path.display()
            )));
        }

        let session = Session::builder()
            .map_err(|e: ort::Error| ModelError::LoadError(e.to_string()))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e: ort::Error| ModelError::LoadError(e.to_string()))?
            .with_intra_threads(num_cpus())
            .map_err(|e: ort::Error| ModelError::LoadError(e.to_string()))?
            .commit_from_file(&model_path)
            .map_err(|e: ort::Error| ModelError::LoadError(e.to_string()))?;

        let mut tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| ModelError::TokenizerError(e.to_string()))?;

        tokenizer
            .with_truncation(Some(TruncationParams {
                max_length: max_tokens,
                strategy: TruncationStrategy::LongestFirst,
                ..Default::default()
            }))
            .map_err(|e| ModelError::TokenizerError(e.to_string()))?;

        tokenizer.with_padding(Some(PaddingParams {
            strategy: PaddingStrategy::BatchLongest,
            ..Default::default()
        }));

        info!(
            model = %config.model_id,
            dimension = config.dimension,
            "embedding model loaded"
        );

        Ok(Self {
            model: Arc::new(OnnxModel {
                session: Mutex::new(session),
                tokenizer,
                dimension: config.dimension as usize,
            }),
            model_id: config.model_id.clone(),
            batch_size: config.batch_size.max(1) as usize,
        })
    }

    /// Run one batch on the blocking pool.
    async fn run_batch(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>, ModelError> {
        let model = Arc::clone(&self.model);
        tokio::task::spawn_blocking(move || model.embed_batch(&texts))
            .await
            .map_err(|e| ModelError::InferenceError(format!("embedding task failed: {e}")))?
    }
}

impl OnnxModel {
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, ModelError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let encodings = self
            .tokenizer
            .encode_batch(texts.to_vec(), true)
            .map_err(|e| ModelError::TokenizerError(e.to_string()))?;

        let max_len = encodings
            .iter()
            .map(|e| e.get_ids().len())
            .max()
            .unwrap_or(0);
        let batch_size = encodings.len();

        let mut input_ids = vec![0i64; batch_size * max_len];
        let mut attention_mask = vec![0i64; batch_size * max_len];
        let mut token_type_ids = vec![0i64; batch_size * max_len];

        for (i, encoding) in encodings.iter().enumerate() {
            let ids = encoding.get_ids();
            let mask = encoding.get_attention_mask();
            let types = encoding.get_type_ids();
            for (j, ((&id, &m), &t)) in ids.iter().zip(mask).zip(types).enumerate() {
                input_ids[i * max_len + j] = id as i64;
                attention_mask[i * max_len + j] = m as i64;
                token_type_ids[i * max_len + j] = t as i64;
            }
        }

        let input_ids_tensor = Tensor::from_array(([batch_size, max_len], input_ids))
            .map_err(|e: ort::Error| ModelError::InferenceError(e.to_string()))?;
        let attention_mask_tensor =
            Tensor::from_array(([batch_size, max_len], attention_mask.clone()))
                .map_err(|e: ort::Error| ModelError::InferenceError(e.to_string()))?;
        let token_type_ids_tensor = Tensor::from_array(([batch_size, max_len], token_type_ids))
            .map_err(|e: ort::Error| ModelError::InferenceError(e.to_string()))?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| ModelError::InferenceError("session lock poisoned".to_string()))?;

        let outputs = session
            .run(ort::inputs![
                input_ids_tensor,
                attention_mask_tensor,
                token_type_ids_tensor
            ])
            .map_err(|e: ort::Error| ModelError::InferenceError(e.to_string()))?;

        let output_array = outputs[0]
            .try_extract_array::<f32>()
            .map_err(|e: ort::Error| ModelError::InferenceError(e.to_string()))?;

        pool_output(&output_array, &attention_mask, max_len, self.dimension)
    }
}

#[async_trait]
impl Embedder for OnnxEmbedder {
    async fn embed_documents(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        let mut all = Vec::with_capacity(texts.len());
        for batch in texts.chunks(self.batch_size) {
            all.extend(self.run_batch(batch.to_vec()).await?);
        }
        Ok(all)
    }

    async fn embed_query(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        self.run_batch(vec![text.to_string()])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| EmbeddingError::InvalidResponse("empty embedding output".to_string()))
    }

    fn dimension(&self) -> usize {
        self.model.dimension
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}

fn num_cpus() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
}

/// Turn raw model output into one unit vector per input.
///
/// Rank-3 output is token embeddings and gets mean-pooled over the
/// positions where `attention_mask` is set. Rank-2 output is taken as-is.
fn pool_output(
    output: &ArrayViewD<'_, f32>,
    attention_mask: &[i64],
    max_len: usize,
    dimension: usize,
) -> Result<Vec<Vec<f32>>, ModelError> {
    let shape = output.shape().to_vec();
    let hidden = *shape.last().unwrap_or(&0);
    if hidden != dimension {
        return Err(ModelError::InferenceError(format!(
            "model produced {}-dimensional output, configured dimension is {}",
            hidden, dimension
        )));
    }

    match shape.len() {
        3 => Ok((0..shape[0])
            .map(|i| {
                let mut pooled = vec![0f32; dimension];
                let mut count = 0f32;
                for j in 0..shape[1] {
                    if attention_mask.get(i * max_len + j).copied().unwrap_or(0) == 0 {
                        continue;
                    }
                    count += 1.0;
                    for (d, value) in pooled.iter_mut().enumerate() {
                        *value += output[[i, j, d]];
                    }
                }
                if count > 0.0 {
                    pooled.iter_mut().for_each(|v| *v /= count);
                }
                normalize(&pooled)
            })
            .collect()),
        2 => Ok((0..shape[0])
            .map(|i| {
                let embedding: Vec<f32> = (0..dimension).map(|d| output[[i, d]]).collect();
                normalize(&embedding)
            })
            .collect()),
        _ => Err(ModelError::InferenceError(format!(
            "unexpected output shape: {:?}",
            shape
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_missing_model() {
        let dir = tempfile::tempdir().unwrap();
        let result = OnnxEmbedder::load(&EmbeddingConfig::default(), dir.path());
        assert!(matches!(result, Err(ModelError::NotFound(_))));
    }

    #[test]
    fn test_pool_output_skips_padding_tokens() {
        // One input, three positions, the last one padding.
        let output = ndarray::Array3::from_shape_vec(
            (1, 3, 2),
            vec![3.0, 0.0, 0.0, 4.0, 100.0, 100.0],
        )
        .unwrap();
        let mask = vec![1, 1, 0];

        let pooled = pool_output(&output.view().into_dyn(), &mask, 3, 2).unwrap();

        assert_eq!(pooled.len(), 1);
        assert!((pooled[0][0] - 0.6).abs() < 1e-6);
        assert!((pooled[0][1] - 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_pool_output_sentence_embeddings() {
        let output = ndarray::Array2::from_shape_vec((2, 2), vec![0.0, 2.0, 5.0, 0.0]).unwrap();

        let pooled = pool_output(&output.view().into_dyn(), &[1, 1], 1, 2).unwrap();

        assert_eq!(pooled, vec![vec![0.0, 1.0], vec![1.0, 0.0]]);
    }

    #[test]
    fn test_pool_output_rejects_dimension_mismatch() {
        let output = ndarray::Array2::<f32>::zeros((1, 3));
        let result = pool_output(&output.view().into_dyn(), &[1], 1, 2);
        assert!(matches!(result, Err(ModelError::InferenceError(_))));
    }
}
