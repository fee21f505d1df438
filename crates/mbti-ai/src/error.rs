use std::path::PathBuf;

use mbti_core::Axis;
use thiserror::Error;

/// Failure constructing one of the five start-up artifacts.
///
/// Always fatal: a predictor is never built from a partial set.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("artifact not found: {0}")]
    NotFound(PathBuf),

    #[error("reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parsing classifier artifact {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid classifier artifact {path}: {reason}")]
    Invalid { path: PathBuf, reason: String },

    #[error("{axis} classifier expects {expected}-dim embeddings, embedder produces {actual}")]
    DimensionMismatch {
        axis: Axis,
        expected: usize,
        actual: usize,
    },

    #[cfg(feature = "onnx")]
    #[error("load tokenizer: {0}")]
    Tokenizer(String),

    #[cfg(feature = "onnx")]
    #[error("onnx runtime error: {0}")]
    Onnx(String),
}

/// Failure inside the embedder or a classifier head on a single request.
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("embedding has {actual} dimensions, expected {expected}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("unexpected model output shape: {0:?}")]
    OutputShape(Vec<i64>),

    #[error("embedding session lock poisoned")]
    Poisoned,

    #[cfg(feature = "onnx")]
    #[error("tokenize: {0}")]
    Tokenizer(String),

    #[cfg(feature = "onnx")]
    #[error("onnx runtime error: {0}")]
    Onnx(String),
}

/// Outcome of a failed [`Predictor::predict`](crate::Predictor::predict) call.
#[derive(Debug, Error)]
pub enum PredictError {
    /// Input was empty or whitespace only; nothing was run.
    #[error("input text is empty")]
    EmptyInput,

    #[error("embedding failed: {0}")]
    Embedding(#[source] InferenceError),

    #[error("{axis} classifier failed: {source}")]
    Classifier {
        axis: Axis,
        #[source]
        source: InferenceError,
    },
}
