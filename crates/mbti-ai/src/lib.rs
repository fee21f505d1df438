//! AI inference layer: sentence embeddings and the four per-axis classifier heads.

pub mod artifacts;
pub mod classifier;
pub mod embedding;
mod error;
pub mod predictor;

#[cfg(feature = "onnx")]
mod embedder;
#[cfg(feature = "onnx")]
pub use embedder::{Embedder, EmbedderOptions};

pub use artifacts::ArtifactPaths;
pub use classifier::{ClassifierHeads, LinearClassifier, TraitClassifier, Verdict};
pub use embedding::EmbeddingProvider;
pub use error::{InferenceError, LoadError, PredictError};
pub use predictor::{AxisOutcome, Prediction, Predictor};
