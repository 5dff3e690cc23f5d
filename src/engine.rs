use crate::error::OcrError;
use crate::preprocessing::NormalizedImage;

/// Axis-aligned bounding box of a recognized text region, in pixels of the
/// normalized image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

/// One unvalidated detection as reported by an engine
#[derive(Debug, Clone)]
pub struct RawDetection {
    pub region: Region,
    pub text: String,
    pub confidence: f64,
}

/// Trait that all text recognition engines must implement
///
/// Engines are built once at startup and shared across requests, so
/// `recognize` takes `&self` and must not mutate engine state.
pub trait TextRecognizer: Send + Sync {
    /// Returns the engine identifier (e.g., "ocrs")
    fn name(&self) -> &'static str;

    /// Returns a human-readable description of the engine
    fn description(&self) -> &'static str;

    /// Recognize text regions in reading order as produced by the engine
    fn recognize(&self, image: &NormalizedImage) -> Result<Vec<RawDetection>, OcrError>;

    /// Languages the engine was initialized for
    fn supported_languages(&self) -> Vec<String>;

    /// Whether inference runs on a hardware accelerator
    fn uses_accelerator(&self) -> bool {
        false
    }

    /// Whether concurrent `recognize` calls are safe; when false the adapter
    /// serializes them
    fn is_reentrant(&self) -> bool {
        true
    }
}
