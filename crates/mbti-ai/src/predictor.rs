//! End-to-end prediction: normalize → embed → four heads → type code.

use std::sync::Arc;

use mbti_core::{Axis, TypeCode, assemble, is_blank, normalize};
use serde::Serialize;
use tracing::{debug, warn};

use crate::{ClassifierHeads, EmbeddingProvider, PredictError};

/// Letter and confidence resolved for one axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AxisOutcome {
    pub axis: Axis,
    pub letter: char,
    /// Probability the head assigned to `letter`.
    pub confidence: f32,
}

/// Result of a successful prediction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    pub type_code: TypeCode,
    /// Text as fed to the embedder.
    pub cleaned: String,
    /// Per-axis detail in type-code order.
    pub axes: [AxisOutcome; 4],
}

impl Prediction {
    pub fn description(&self) -> &'static str {
        self.type_code.description()
    }
}

/// Owns the embedder and the four heads for the lifetime of the process.
///
/// Build one at start-up and share it (`Arc<Predictor>`) with every request.
#[derive(Clone)]
pub struct Predictor {
    embedder: Arc<dyn EmbeddingProvider>,
    heads: ClassifierHeads,
}

impl Predictor {
    pub fn new(embedder: Arc<dyn EmbeddingProvider>, heads: ClassifierHeads) -> Self {
        Self { embedder, heads }
    }

    /// Load the ONNX embedder and all four heads, failing if any is missing
    /// or if a head's width does not match the embedder.
    #[cfg(feature = "onnx")]
    pub fn load(
        paths: &crate::ArtifactPaths,
        options: &crate::EmbedderOptions,
    ) -> Result<Self, crate::LoadError> {
        let (heads, dims) = crate::artifacts::load_classifiers(paths)?;
        let embedder = crate::Embedder::load(&paths.embedder_dir, options)?;
        crate::artifacts::check_dims(dims, embedder.dim())?;
        Ok(Self::new(Arc::new(embedder), heads))
    }

    /// Embedding width of the underlying model.
    pub fn dim(&self) -> usize {
        self.embedder.dim()
    }

    /// Predict the type code for `raw_text`.
    ///
    /// Empty or whitespace-only input is rejected before the embedder or
    /// any head is touched. Any embedder or head failure fails the whole
    /// request; a partial code is never returned.
    pub fn predict(&self, raw_text: &str) -> Result<Prediction, PredictError> {
        if is_blank(raw_text) {
            warn!("rejected empty input");
            return Err(PredictError::EmptyInput);
        }

        let cleaned = normalize(raw_text);
        let embedding = self
            .embedder
            .embed(&cleaned)
            .map_err(PredictError::Embedding)?;

        let mut outputs = [false; 4];
        let mut axes = Axis::ALL.map(|axis| AxisOutcome {
            axis,
            letter: axis.letter(false),
            confidence: 0.0,
        });
        for (axis, head) in self.heads.iter() {
            let verdict = head
                .classify(&embedding)
                .map_err(|source| PredictError::Classifier { axis, source })?;
            outputs[axis.index()] = verdict.output;
            axes[axis.index()] = AxisOutcome {
                axis,
                letter: axis.letter(verdict.output),
                confidence: verdict.confidence(),
            };
        }

        let [ie, ns, tf, jp] = outputs;
        let type_code = assemble(ie, ns, tf, jp);
        debug!(
            %type_code,
            input_chars = raw_text.chars().count(),
            cleaned_chars = cleaned.len(),
            "predicted type"
        );
        Ok(Prediction {
            type_code,
            cleaned,
            axes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{InferenceError, LinearClassifier, TraitClassifier, Verdict};
    use std::collections::HashSet;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const DIM: usize = 8;

    /// Deterministic stand-in: hashes characters into a fixed-width vector
    /// and records every text it was asked to embed.
    #[derive(Default)]
    struct MockEmbedder {
        calls: AtomicUsize,
        seen: Mutex<Vec<String>>,
        fail: bool,
    }

    impl EmbeddingProvider for MockEmbedder {
        fn dim(&self) -> usize {
            DIM
        }

        fn embed(&self, text: &str) -> Result<Vec<f32>, InferenceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.seen.lock().unwrap().push(text.to_string());
            if self.fail {
                return Err(InferenceError::OutputShape(vec![1, 0, 0]));
            }
            let mut v = vec![0.0f32; DIM];
            for (i, b) in text.bytes().enumerate() {
                v[(i + b as usize) % DIM] += (b as f32 - 100.0) / 10.0;
            }
            Ok(v)
        }
    }

    /// Head returning a fixed output and counting calls.
    struct MockHead {
        calls: AtomicUsize,
        output: Option<bool>,
    }

    impl MockHead {
        fn fixed(output: bool) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                output: Some(output),
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                output: None,
            })
        }
    }

    impl TraitClassifier for MockHead {
        fn classify(&self, embedding: &[f32]) -> Result<Verdict, InferenceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.output {
                Some(output) => Ok(Verdict {
                    output,
                    probability: if output { 0.9 } else { 0.2 },
                }),
                None => Err(InferenceError::DimensionMismatch {
                    expected: DIM + 1,
                    actual: embedding.len(),
                }),
            }
        }
    }

    fn fixed_predictor(
        outputs: [bool; 4],
    ) -> (Predictor, Arc<MockEmbedder>, [Arc<MockHead>; 4]) {
        let embedder = Arc::new(MockEmbedder::default());
        let heads = outputs.map(MockHead::fixed);
        let predictor = Predictor::new(
            embedder.clone(),
            ClassifierHeads::new(
                heads[0].clone(),
                heads[1].clone(),
                heads[2].clone(),
                heads[3].clone(),
            ),
        );
        (predictor, embedder, heads)
    }

    /// Linear heads over the mock embedder, so outputs depend on the text.
    fn linear_predictor() -> Predictor {
        let head = |seed: f64| -> Arc<dyn TraitClassifier> {
            let coef = (0..DIM).map(|i| ((i as f64 + seed) * 1.7).sin()).collect();
            Arc::new(LinearClassifier::new(coef, 0.05 * seed))
        };
        Predictor::new(
            Arc::new(MockEmbedder::default()),
            ClassifierHeads::new(head(1.0), head(2.0), head(3.0), head(4.0)),
        )
    }

    fn head_calls(heads: &[Arc<MockHead>; 4]) -> Vec<usize> {
        heads
            .iter()
            .map(|h| h.calls.load(Ordering::SeqCst))
            .collect()
    }

    #[test]
    fn assembles_heads_in_axis_order() {
        let (predictor, _, _) = fixed_predictor([true, false, true, false]);
        let prediction = predictor.predict("anything at all").unwrap();
        assert_eq!(prediction.type_code.to_string(), "ISTP");
        assert_eq!(
            prediction.axes.map(|a| a.letter),
            ['I', 'S', 'T', 'P']
        );
        assert_eq!(prediction.axes.map(|a| a.axis), Axis::ALL);
    }

    #[test]
    fn confidence_is_for_the_chosen_letter() {
        let (predictor, _, _) = fixed_predictor([true, false, true, true]);
        let prediction = predictor.predict("text").unwrap();
        assert!((prediction.axes[0].confidence - 0.9).abs() < 1e-6);
        assert!((prediction.axes[1].confidence - 0.8).abs() < 1e-6);
    }

    #[test]
    fn embedder_sees_normalized_text() {
        let (predictor, embedder, _) = fixed_predictor([true; 4]);
        let prediction = predictor
            .predict("I love organizing detailed plans and analyzing data quietly.")
            .unwrap();
        let expected = "i love organizing detailed plans and analyzing data quietly";
        assert_eq!(prediction.cleaned, expected);
        assert_eq!(*embedder.seen.lock().unwrap(), vec![expected.to_string()]);
    }

    #[test]
    fn each_component_runs_once_per_request() {
        let (predictor, embedder, heads) = fixed_predictor([false; 4]);
        predictor.predict("hello").unwrap();
        assert_eq!(embedder.calls.load(Ordering::SeqCst), 1);
        assert_eq!(head_calls(&heads), vec![1, 1, 1, 1]);
    }

    #[test]
    fn empty_input_never_reaches_models() {
        let (predictor, embedder, heads) = fixed_predictor([true; 4]);
        for input in ["", " ", "\t\n  ", "\u{2003}"] {
            let err = predictor.predict(input).unwrap_err();
            assert!(matches!(err, PredictError::EmptyInput), "{input:?}");
        }
        assert_eq!(embedder.calls.load(Ordering::SeqCst), 0);
        assert_eq!(head_calls(&heads), vec![0, 0, 0, 0]);
    }

    #[test]
    fn separator_only_input_is_empty() {
        let (predictor, embedder, heads) = fixed_predictor([true; 4]);
        let err = predictor.predict("\u{1c}\u{1d} \u{1e}\u{1f}").unwrap_err();
        assert!(matches!(err, PredictError::EmptyInput));
        assert_eq!(embedder.calls.load(Ordering::SeqCst), 0);
        assert_eq!(head_calls(&heads), vec![0, 0, 0, 0]);
    }

    #[test]
    fn noise_only_input_still_runs_pipeline() {
        // Not whitespace-only, so it is a real request with empty cleaned text.
        let (predictor, embedder, _) = fixed_predictor([true; 4]);
        let prediction = predictor.predict("123 !!!").unwrap();
        assert_eq!(prediction.cleaned, "");
        assert_eq!(embedder.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn embedder_failure_fails_request_before_heads() {
        let embedder = Arc::new(MockEmbedder {
            fail: true,
            ..Default::default()
        });
        let head = MockHead::fixed(true);
        let predictor = Predictor::new(
            embedder,
            ClassifierHeads::new(head.clone(), head.clone(), head.clone(), head.clone()),
        );

        let err = predictor.predict("hello").unwrap_err();
        assert!(matches!(err, PredictError::Embedding(_)));
        assert_eq!(head.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn head_failure_names_axis_and_returns_no_code() {
        let ok = MockHead::fixed(true);
        let predictor = Predictor::new(
            Arc::new(MockEmbedder::default()),
            ClassifierHeads::new(ok.clone(), ok.clone(), MockHead::failing(), ok.clone()),
        );

        let err = predictor.predict("hello").unwrap_err();
        match err {
            PredictError::Classifier { axis, .. } => assert_eq!(axis, Axis::TF),
            other => panic!("expected classifier error, got {other:?}"),
        }
    }

    #[test]
    fn prediction_is_deterministic() {
        let predictor = linear_predictor();
        for text in [
            "I love organizing detailed plans and analyzing data quietly.",
            "Parties! Friends! http://fun.example Let's go|||tonight",
            "x",
        ] {
            let a = predictor.predict(text).unwrap();
            let b = predictor.predict(text).unwrap();
            assert_eq!(a, b, "{text:?}");
        }
    }

    #[test]
    fn scenario_yields_valid_code() {
        let predictor = linear_predictor();
        let prediction = predictor
            .predict("I love organizing detailed plans and analyzing data quietly.")
            .unwrap();
        let code = prediction.type_code.to_string();
        let all: HashSet<String> = TypeCode::all().map(|c| c.to_string()).collect();
        assert_eq!(code.len(), 4);
        assert!(all.contains(&code), "{code} is not one of the 16 codes");
    }

    #[test]
    fn shared_across_threads() {
        let predictor = Arc::new(linear_predictor());
        let expected = predictor.predict("shared predictor").unwrap();
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let p = Arc::clone(&predictor);
                std::thread::spawn(move || p.predict("shared predictor").unwrap())
            })
            .collect();
        for h in handles {
            assert_eq!(h.join().unwrap(), expected);
        }
    }

    #[test]
    fn description_follows_code() {
        let (predictor, _, _) = fixed_predictor([true, true, true, false]);
        let prediction = predictor.predict("text").unwrap();
        assert_eq!(prediction.type_code.to_string(), "INTP");
        assert_eq!(
            prediction.description(),
            "Thinkers: Analytical, logical, and curious."
        );

        let (predictor, _, _) = fixed_predictor([true, true, true, true]);
        let prediction = predictor.predict("text").unwrap();
        assert_eq!(prediction.description(), mbti_core::FALLBACK_DESCRIPTION);
    }
}
