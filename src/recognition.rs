//! Boundary between the service and the recognition engine
//!
//! Engine output is untrusted: every detection is checked here before it is
//! turned into a [`RecognitionResult`].

use crate::engine::{RawDetection, Region, TextRecognizer};
use crate::error::OcrError;
use crate::preprocessing::NormalizedImage;
use std::sync::{Arc, Mutex};

/// A validated (region, text, confidence) triple
#[derive(Debug, Clone, PartialEq)]
pub struct RecognitionResult {
    region: Region,
    text: String,
    confidence: f64,
}

impl RecognitionResult {
    pub fn region(&self) -> &Region {
        &self.region
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    fn try_from_raw(index: usize, raw: RawDetection) -> Result<Self, OcrError> {
        if !raw.confidence.is_finite() || !(0.0..=1.0).contains(&raw.confidence) {
            return Err(OcrError::RecognitionError(format!(
                "detection {} has confidence {} outside [0, 1]",
                index, raw.confidence
            )));
        }

        Ok(Self {
            region: raw.region,
            text: raw.text,
            confidence: raw.confidence,
        })
    }
}

#[cfg(test)]
impl RecognitionResult {
    pub(crate) fn scripted(text: &str, confidence: f64) -> Self {
        Self {
            region: Region {
                x: 0,
                y: 0,
                width: 1,
                height: 1,
            },
            text: text.to_string(),
            confidence,
        }
    }
}

/// Wraps the process-wide recognition engine
pub struct RecognitionAdapter {
    engine: Arc<dyn TextRecognizer>,
    /// Held around `recognize` for engines that are not reentrant
    gate: Option<Mutex<()>>,
}

impl RecognitionAdapter {
    pub fn new(engine: Arc<dyn TextRecognizer>) -> Self {
        let gate = if engine.is_reentrant() {
            None
        } else {
            tracing::info!(
                "Engine {} is not reentrant, recognition calls will be serialized",
                engine.name()
            );
            Some(Mutex::new(()))
        };

        Self { engine, gate }
    }

    pub fn engine(&self) -> &Arc<dyn TextRecognizer> {
        &self.engine
    }

    /// Run recognition and validate every detection
    ///
    /// Blocks for the duration of inference.
    pub fn recognize(&self, image: &NormalizedImage) -> Result<Vec<RecognitionResult>, OcrError> {
        let raw = {
            let _guard = self
                .gate
                .as_ref()
                .map(|gate| gate.lock().unwrap_or_else(|poisoned| poisoned.into_inner()));
            self.engine.recognize(image)?
        };

        tracing::debug!(
            "Engine {} returned {} detections for {}x{} image",
            self.engine.name(),
            raw.len(),
            image.width(),
            image.height()
        );

        raw.into_iter()
            .enumerate()
            .map(|(i, detection)| RecognitionResult::try_from_raw(i, detection))
            .collect()
    }
}
