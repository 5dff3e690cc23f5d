//! Request-level orchestration: decode, preprocess, recognize, aggregate

use crate::aggregator::{aggregate, ExtractionResponse};
use crate::config::Config;
use crate::decoder;
use crate::engine::TextRecognizer;
use crate::error::OcrError;
use crate::preprocessing::Pipeline;
use crate::recognition::RecognitionAdapter;
use std::sync::Arc;

/// Runs one upload through the whole chain
///
/// Synchronous and blocking; async callers should run [`OcrService::extract`]
/// on a blocking thread.
pub struct OcrService {
    pipeline: Pipeline,
    adapter: RecognitionAdapter,
    confidence_threshold: f64,
}

impl OcrService {
    pub fn new(config: &Config, engine: Arc<dyn TextRecognizer>) -> Self {
        Self {
            pipeline: Pipeline::new(config.preprocess.clone()),
            adapter: RecognitionAdapter::new(engine),
            confidence_threshold: config.confidence_threshold,
        }
    }

    pub fn engine(&self) -> &Arc<dyn TextRecognizer> {
        self.adapter.engine()
    }

    /// Extract text from raw upload bytes
    pub fn extract(&self, bytes: &[u8]) -> Result<ExtractionResponse, OcrError> {
        let decoded = decoder::decode(bytes)?;
        let (width, height) = (decoded.width(), decoded.height());

        let processed = self.pipeline.process(decoded)?;
        let steps = processed
            .steps
            .iter()
            .map(|s| format!("{}={}ms", s.name, s.time_ms))
            .collect::<Vec<_>>()
            .join(", ");
        tracing::debug!(
            "Preprocessed {}x{} -> {}x{} in {}ms ({})",
            width,
            height,
            processed.image.width(),
            processed.image.height(),
            processed.total_time_ms,
            steps
        );

        let results = self.adapter.recognize(&processed.image)?;
        Ok(aggregate(&results, self.confidence_threshold))
    }
}
