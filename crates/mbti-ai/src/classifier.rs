//! Per-axis binary classifier heads.
//!
//! Each head maps a sentence embedding to label 0 or 1 for one axis. The
//! shipped heads are logistic regressions, exported from their fitted
//! coefficients as JSON:
//!
//! ```json
//! { "axis": "IE", "coef": [0.12, -0.03, ...], "intercept": -0.4, "classes": [0, 1] }
//! ```
//!
//! `axis` and `classes` are optional; `classes` defaults to `[0, 1]`.

use std::path::Path;
use std::sync::Arc;

use mbti_core::Axis;
use serde::Deserialize;
use tracing::info;

use crate::{InferenceError, LoadError};

/// Raw output of one head for one embedding.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Verdict {
    /// `true` when the head predicts label 1.
    pub output: bool,
    /// Probability the head assigns to label 1.
    pub probability: f32,
}

impl Verdict {
    /// Probability of the label actually chosen.
    pub fn confidence(&self) -> f32 {
        if self.output {
            self.probability
        } else {
            1.0 - self.probability
        }
    }
}

/// A binary classifier over embedding vectors.
///
/// Heads are stateless with respect to each other and may be evaluated in
/// any order.
pub trait TraitClassifier: Send + Sync {
    fn classify(&self, embedding: &[f32]) -> Result<Verdict, InferenceError>;
}

#[derive(Debug, Deserialize)]
struct LinearArtifact {
    #[serde(default)]
    axis: Option<Axis>,
    coef: Vec<f64>,
    intercept: f64,
    #[serde(default = "default_classes")]
    classes: [u8; 2],
}

fn default_classes() -> [u8; 2] {
    [0, 1]
}

/// Logistic-regression head: `d = coef · x + intercept`.
///
/// Predicts `classes[1]` when `d > 0`, otherwise `classes[0]`, matching
/// scikit-learn's `LogisticRegression.predict`. Parameters are kept and
/// the decision accumulated in `f64`; only the reported probability is `f32`.
#[derive(Debug, Clone)]
pub struct LinearClassifier {
    coef: Vec<f64>,
    intercept: f64,
    /// `classes[1] == 1`, i.e. a positive decision means label 1.
    positive_is_one: bool,
}

impl LinearClassifier {
    /// Build directly from fitted parameters with classes `[0, 1]`.
    pub fn new(coef: Vec<f64>, intercept: f64) -> Self {
        Self {
            coef,
            intercept,
            positive_is_one: true,
        }
    }

    /// Load the head for `axis` from a JSON artifact.
    pub fn load(path: &Path, axis: Axis) -> Result<Self, LoadError> {
        if !path.exists() {
            return Err(LoadError::NotFound(path.to_path_buf()));
        }
        let bytes = std::fs::read(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let artifact: LinearArtifact =
            serde_json::from_slice(&bytes).map_err(|source| LoadError::Parse {
                path: path.to_path_buf(),
                source,
            })?;

        let invalid = |reason: String| LoadError::Invalid {
            path: path.to_path_buf(),
            reason,
        };

        if let Some(found) = artifact.axis
            && found != axis
        {
            return Err(invalid(format!("artifact is for axis {found}, loaded as {axis}")));
        }
        if artifact.coef.is_empty() {
            return Err(invalid("empty coefficient vector".into()));
        }
        if let Some(i) = artifact.coef.iter().position(|c| !c.is_finite()) {
            return Err(invalid(format!("non-finite coefficient at index {i}")));
        }
        if !artifact.intercept.is_finite() {
            return Err(invalid("non-finite intercept".into()));
        }
        let positive_is_one = match artifact.classes {
            [0, 1] => true,
            [1, 0] => false,
            other => return Err(invalid(format!("classes must be [0, 1] or [1, 0], got {other:?}"))),
        };

        info!(
            %axis,
            dim = artifact.coef.len(),
            path = %path.display(),
            "loaded classifier head"
        );
        Ok(Self {
            coef: artifact.coef,
            intercept: artifact.intercept,
            positive_is_one,
        })
    }

    /// Embedding width this head was fitted on.
    pub fn dim(&self) -> usize {
        self.coef.len()
    }

    fn decision(&self, embedding: &[f32]) -> f64 {
        self.coef
            .iter()
            .zip(embedding)
            .map(|(c, &x)| c * f64::from(x))
            .sum::<f64>()
            + self.intercept
    }
}

impl TraitClassifier for LinearClassifier {
    fn classify(&self, embedding: &[f32]) -> Result<Verdict, InferenceError> {
        if embedding.len() != self.coef.len() {
            return Err(InferenceError::DimensionMismatch {
                expected: self.coef.len(),
                actual: embedding.len(),
            });
        }

        let d = self.decision(embedding);
        let positive = d > 0.0;
        let p_positive = sigmoid(d);
        let (output, probability) = if self.positive_is_one {
            (positive, p_positive)
        } else {
            (!positive, 1.0 - p_positive)
        };
        Ok(Verdict {
            output,
            probability: probability as f32,
        })
    }
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// The four heads, one per axis, held in [`Axis::ALL`] order.
#[derive(Clone)]
pub struct ClassifierHeads {
    heads: [Arc<dyn TraitClassifier>; 4],
}

impl ClassifierHeads {
    pub fn new(
        ie: Arc<dyn TraitClassifier>,
        ns: Arc<dyn TraitClassifier>,
        tf: Arc<dyn TraitClassifier>,
        jp: Arc<dyn TraitClassifier>,
    ) -> Self {
        Self {
            heads: [ie, ns, tf, jp],
        }
    }

    pub fn get(&self, axis: Axis) -> &dyn TraitClassifier {
        self.heads[axis.index()].as_ref()
    }

    /// `(axis, head)` pairs in type-code order.
    pub fn iter(&self) -> impl Iterator<Item = (Axis, &dyn TraitClassifier)> {
        Axis::ALL.into_iter().map(|axis| (axis, self.get(axis)))
    }
}
