//! ONNX Runtime embedding pipeline for sentence-transformers models.
//!
//! Implements mean-pooled embeddings using all-MiniLM-L6-v2 (384 dimensions).
//! The model directory must contain `model.onnx` and `tokenizer.json`.

use std::path::Path;
use std::sync::Mutex;

use ort::session::Session;
use ort::value::Tensor;
use tokenizers::{Tokenizer, TruncationParams};
use tracing::{debug, info};

use crate::embedding::{EmbeddingProvider, l2_normalize};
use crate::{InferenceError, LoadError};

pub const MODEL_FILE: &str = "model.onnx";
pub const TOKENIZER_FILE: &str = "tokenizer.json";

const DEFAULT_DIM: usize = 384;

/// Tunables for [`Embedder::load`].
#[derive(Debug, Clone)]
pub struct EmbedderOptions {
    /// Token limit; longer inputs are truncated (256 for MiniLM).
    pub max_length: usize,
}

impl Default for EmbedderOptions {
    fn default() -> Self {
        Self { max_length: 256 }
    }
}

/// Sentence embedding generator using ONNX Runtime.
///
/// Produces L2-normalized vectors, matching what sentence-transformers
/// returns for all-MiniLM-L6-v2. The session needs exclusive access while
/// running, so it sits behind a mutex and one embedder can serve every
/// request in the process.
pub struct Embedder {
    session: Mutex<Session>,
    tokenizer: Tokenizer,
    dim: usize,
}

impl Embedder {
    /// Load an embedding model from a directory containing `model.onnx` and `tokenizer.json`.
    pub fn load(model_dir: &Path, options: &EmbedderOptions) -> Result<Self, LoadError> {
        let model_path = model_dir.join(MODEL_FILE);
        let tokenizer_path = model_dir.join(TOKENIZER_FILE);

        for path in [&model_path, &tokenizer_path] {
            if !path.exists() {
                return Err(LoadError::NotFound(path.clone()));
            }
        }

        let session = Session::builder()
            .map_err(|e| LoadError::Onnx(e.to_string()))?
            .commit_from_file(&model_path)
            .map_err(|e| LoadError::Onnx(e.to_string()))?;

        // Last dimension of the token-embedding output.
        let dim = session
            .outputs()
            .first()
            .and_then(|output| infer_dim(output.dtype()))
            .unwrap_or(DEFAULT_DIM);

        let mut tokenizer =
            Tokenizer::from_file(&tokenizer_path).map_err(|e| LoadError::Tokenizer(e.to_string()))?;
        tokenizer
            .with_truncation(Some(TruncationParams {
                max_length: options.max_length,
                ..Default::default()
            }))
            .map_err(|e| LoadError::Tokenizer(format!("set truncation: {e}")))?;
        // One sequence per run, nothing to pad against.
        tokenizer.with_padding(None);

        info!(
            dim,
            max_length = options.max_length,
            model = %model_path.display(),
            "loaded embedding model"
        );
        Ok(Self {
            session: Mutex::new(session),
            tokenizer,
            dim,
        })
    }
}

impl EmbeddingProvider for Embedder {
    fn dim(&self) -> usize {
        self.dim
    }

    fn embed(&self, text: &str) -> Result<Vec<f32>, InferenceError> {
        let encoding = self
            .tokenizer
            .encode(text, true)
            .map_err(|e| InferenceError::Tokenizer(e.to_string()))?;

        let seq_len = encoding.get_ids().len();
        let input_ids: Vec<i64> = encoding.get_ids().iter().map(|&id| id as i64).collect();
        let attention_mask: Vec<i64> = encoding
            .get_attention_mask()
            .iter()
            .map(|&m| m as i64)
            .collect();
        let token_type_ids: Vec<i64> = encoding.get_type_ids().iter().map(|&t| t as i64).collect();

        let shape = [1i64, seq_len as i64];
        let ids_tensor = Tensor::from_array((shape, input_ids.into_boxed_slice())).map_err(onnx)?;
        let mask_tensor =
            Tensor::from_array((shape, attention_mask.clone().into_boxed_slice())).map_err(onnx)?;
        let type_tensor =
            Tensor::from_array((shape, token_type_ids.into_boxed_slice())).map_err(onnx)?;

        let mut session = self.session.lock().map_err(|_| InferenceError::Poisoned)?;
        let outputs = session
            .run(ort::inputs![
                "input_ids" => ids_tensor,
                "attention_mask" => mask_tensor,
                "token_type_ids" => type_tensor,
            ])
            .map_err(onnx)?;

        // Token embeddings: [1, seq_len, dim].
        let (output_shape, output_data) = outputs[0].try_extract_tensor::<f32>().map_err(onnx)?;
        let dims: &[i64] = output_shape;
        if dims.len() != 3 || dims[0] != 1 || dims[2] as usize != self.dim {
            return Err(InferenceError::OutputShape(dims.to_vec()));
        }
        let tokens = (dims[1] as usize).min(seq_len);

        // Mean pooling over attended tokens.
        let mut pooled = vec![0.0f32; self.dim];
        let mut token_count = 0.0f32;
        for (j, &mask) in attention_mask.iter().take(tokens).enumerate() {
            if mask > 0 {
                let offset = j * self.dim;
                for (p, &v) in pooled.iter_mut().zip(&output_data[offset..offset + self.dim]) {
                    *p += v;
                }
                token_count += 1.0;
            }
        }
        if token_count > 0.0 {
            for p in &mut pooled {
                *p /= token_count;
            }
        }
        l2_normalize(&mut pooled);

        debug!(tokens, "embedded text");
        Ok(pooled)
    }
}

fn onnx(e: impl std::fmt::Display) -> InferenceError {
    InferenceError::Onnx(e.to_string())
}

/// Try to infer the embedding dimension from the ONNX model output type.
fn infer_dim(output_type: &ort::value::ValueType) -> Option<usize> {
    match output_type {
        ort::value::ValueType::Tensor { shape, .. } => shape
            .last()
            .and_then(|&d| if d > 0 { Some(d as usize) } else { None }),
        _ => None,
    }
}
