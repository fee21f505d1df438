//! The seam between the pipeline and whatever produces sentence embeddings.

use crate::InferenceError;

/// Maps cleaned text to a fixed-length vector.
///
/// Implementations are constructed once per process and shared read-only
/// across requests, so `embed` takes `&self`. For a fixed model version the
/// same text must always produce the same vector.
pub trait EmbeddingProvider: Send + Sync {
    /// Dimensionality of every vector returned by [`embed`](Self::embed).
    fn dim(&self) -> usize;

    fn embed(&self, text: &str) -> Result<Vec<f32>, InferenceError>;
}

/// L2-normalize a vector in place. Zero vectors are left untouched.
pub fn l2_normalize(v: &mut [f32]) {
    let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in v.iter_mut() {
            *x /= norm;
        }
    }
}
