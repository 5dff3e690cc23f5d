//! Turns recognition results into the response payload

use crate::recognition::RecognitionResult;
use serde::{Deserialize, Serialize};

/// Default minimum confidence; results must be strictly above it
pub const DEFAULT_CONFIDENCE_THRESHOLD: f64 = 0.3;

/// A kept recognition result without its region
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilteredWord {
    pub text: String,
    pub confidence: f64,
}

/// Successful OCR response body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionResponse {
    pub success: bool,
    pub text: String,
    pub words: Vec<FilteredWord>,
    pub word_count: usize,
}

/// Filter, round and concatenate recognition results
///
/// Results whose raw confidence is `<= threshold` are dropped; the rest keep
/// the engine's order. Rounding happens after filtering, so a kept result can
/// report a confidence equal to the threshold (0.3004 against 0.3 gives 0.3).
///
/// Kept texts are joined with single spaces, so a kept empty text still
/// contributes its separator (`["a", "", "b"]` gives `"a  b"`).
pub fn aggregate(results: &[RecognitionResult], threshold: f64) -> ExtractionResponse {
    let words: Vec<FilteredWord> = results
        .iter()
        .filter(|r| r.confidence() > threshold)
        .map(|r| FilteredWord {
            text: r.text().to_string(),
            confidence: round_confidence(r.confidence()),
        })
        .collect();

    let text = words
        .iter()
        .map(|w| w.text.as_str())
        .collect::<Vec<_>>()
        .join(" ");

    tracing::debug!(
        "Kept {} of {} results above confidence {}",
        words.len(),
        results.len(),
        threshold
    );

    ExtractionResponse {
        success: true,
        word_count: words.len(),
        text,
        words,
    }
}

/// Round to 3 decimal places, halves away from zero (`0.8675 -> 0.868`)
pub fn round_confidence(confidence: f64) -> f64 {
    (confidence * 1000.0).round() / 1000.0
}
