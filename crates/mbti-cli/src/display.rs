//! Rendering of predictions for the terminal and for JSON consumers.

use mbti_ai::{AxisOutcome, Prediction};
use mbti_core::TypeCode;
use serde::Serialize;

/// Shown instead of running the pipeline when the input is blank.
pub const EMPTY_INPUT_WARNING: &str = "Please enter some text to predict your MBTI type.";

/// Everything the shells show for one prediction.
#[derive(Debug, Serialize)]
pub struct PredictionReport {
    pub type_code: TypeCode,
    pub description: &'static str,
    pub cleaned: String,
    pub axes: Vec<AxisOutcome>,
}

impl From<&Prediction> for PredictionReport {
    fn from(prediction: &Prediction) -> Self {
        Self {
            type_code: prediction.type_code,
            description: prediction.description(),
            cleaned: prediction.cleaned.clone(),
            axes: prediction.axes.to_vec(),
        }
    }
}

/// Human-readable card: the code, its description, and optionally the
/// per-axis breakdown.
pub fn render(report: &PredictionReport, verbose: bool) -> String {
    let mut out = format!(
        "Predicted MBTI Type: {}\n{}\n",
        report.type_code, report.description
    );
    if verbose {
        out.push_str("\nAxes:\n");
        for outcome in &report.axes {
            let (one, zero) = outcome.axis.poles();
            out.push_str(&format!(
                "  {one}/{zero}: {} ({:.1}%)\n",
                outcome.letter,
                outcome.confidence * 100.0
            ));
        }
        out.push_str(&format!("\nCleaned text: {:?}\n", report.cleaned));
    }
    out
}
