//! Text recognition engine implementations
//!
//! Engines are conditionally compiled based on feature flags. Exactly one
//! engine is built at startup and shared by every request.

#[cfg(feature = "engine-ocrs")]
pub mod ocrs;

use crate::config::Config;
use crate::engine::TextRecognizer;
use crate::error::OcrError;
use std::sync::Arc;

/// Build the recognition engine selected at compile time
#[cfg(feature = "engine-ocrs")]
pub fn create_engine(config: &Config) -> Result<Arc<dyn TextRecognizer>, OcrError> {
    tracing::info!("Initializing ocrs engine...");
    let engine = ocrs::OcrsEngine::new(config)?;
    Ok(Arc::new(engine))
}

#[cfg(not(feature = "engine-ocrs"))]
pub fn create_engine(_config: &Config) -> Result<Arc<dyn TextRecognizer>, OcrError> {
    Err(OcrError::InitializationError(
        "No OCR engine available. Build with --features engine-ocrs".to_string(),
    ))
}

/// Fail unless every requested language is one the engine supports
pub fn check_languages(requested: &[String], supported: &[&str]) -> Result<(), OcrError> {
    let unsupported: Vec<&str> = requested
        .iter()
        .map(String::as_str)
        .filter(|lang| !supported.contains(lang))
        .collect();

    if unsupported.is_empty() {
        Ok(())
    } else {
        Err(OcrError::InitializationError(format!(
            "Unsupported language(s): {} (supported: {})",
            unsupported.join(", "),
            supported.join(", ")
        )))
    }
}
