//! On-disk layout of the five start-up artifacts.
//!
//! ```text
//! models/all-MiniLM-L6-v2/model.onnx
//! models/all-MiniLM-L6-v2/tokenizer.json
//! mbti_models/model_IE.json
//! mbti_models/model_NS.json
//! mbti_models/model_TF.json
//! mbti_models/model_JP.json
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use mbti_core::Axis;

use crate::{ClassifierHeads, LinearClassifier, LoadError};

pub const DEFAULT_MODELS_DIR: &str = "models";
pub const DEFAULT_CLASSIFIERS_DIR: &str = "mbti_models";
pub const DEFAULT_EMBEDDING_MODEL: &str = "all-MiniLM-L6-v2";

/// Where the embedding model and the four classifier heads live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    /// Directory holding `model.onnx` and `tokenizer.json`.
    pub embedder_dir: PathBuf,
    /// Directory holding `model_{AXIS}.json`.
    pub classifier_dir: PathBuf,
}

impl Default for ArtifactPaths {
    fn default() -> Self {
        Self::new(DEFAULT_MODELS_DIR, DEFAULT_EMBEDDING_MODEL, DEFAULT_CLASSIFIERS_DIR)
    }
}

impl ArtifactPaths {
    /// `models_dir/embedding_model` for the embedder, `classifier_dir` for the heads.
    pub fn new(
        models_dir: impl AsRef<Path>,
        embedding_model: &str,
        classifier_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            embedder_dir: models_dir.as_ref().join(embedding_model),
            classifier_dir: classifier_dir.into(),
        }
    }

    /// Path of the head artifact for `axis`.
    pub fn classifier(&self, axis: Axis) -> PathBuf {
        self.classifier_dir.join(format!("model_{axis}.json"))
    }

    /// Every file that must exist before a predictor can be built.
    pub fn required_files(&self) -> Vec<PathBuf> {
        let mut files = vec![
            self.embedder_dir.join("model.onnx"),
            self.embedder_dir.join("tokenizer.json"),
        ];
        files.extend(Axis::ALL.iter().map(|&axis| self.classifier(axis)));
        files
    }

    /// Required files that are not present on disk.
    pub fn missing(&self) -> Vec<PathBuf> {
        self.required_files()
            .into_iter()
            .filter(|p| !p.exists())
            .collect()
    }
}

/// Load all four linear heads.
///
/// Returns the heads with their input widths so callers can check them
/// against the embedder.
pub fn load_classifiers(paths: &ArtifactPaths) -> Result<(ClassifierHeads, [usize; 4]), LoadError> {
    let [ie, ns, tf, jp] = Axis::ALL;
    let ie = LinearClassifier::load(&paths.classifier(ie), ie)?;
    let ns = LinearClassifier::load(&paths.classifier(ns), ns)?;
    let tf = LinearClassifier::load(&paths.classifier(tf), tf)?;
    let jp = LinearClassifier::load(&paths.classifier(jp), jp)?;

    let dims = [ie.dim(), ns.dim(), tf.dim(), jp.dim()];
    let heads = ClassifierHeads::new(Arc::new(ie), Arc::new(ns), Arc::new(tf), Arc::new(jp));
    Ok((heads, dims))
}

/// Check every head was fitted on `embedding_dim`-wide vectors.
pub fn check_dims(dims: [usize; 4], embedding_dim: usize) -> Result<(), LoadError> {
    for (axis, dim) in Axis::ALL.into_iter().zip(dims) {
        if dim != embedding_dim {
            return Err(LoadError::DimensionMismatch {
                axis,
                expected: dim,
                actual: embedding_dim,
            });
        }
    }
    Ok(())
}
