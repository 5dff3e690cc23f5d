//! OCRS engine implementation
//!
//! Pure Rust OCR engine using the ocrs library. No system dependencies required.
//! Downloads neural network models automatically on first use.

use super::check_languages;
use crate::config::Config;
use crate::engine::{RawDetection, Region, TextRecognizer};
use crate::error::OcrError;
use crate::preprocessing::NormalizedImage;
use ocrs::{DecodeMethod, ImageSource, OcrEngine as OcrsOcrEngine, OcrEngineParams, TextItem};
use rten::Model;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Default model URLs from the ocrs project
const DETECTION_MODEL_URL: &str =
    "https://ocrs-models.s3-accelerate.amazonaws.com/text-detection.rten";
const RECOGNITION_MODEL_URL: &str =
    "https://ocrs-models.s3-accelerate.amazonaws.com/text-recognition.rten";

/// ocrs recognizes the Latin alphabet only
const SUPPORTED_LANGUAGES: &[&str] = &["en"];

/// Recognition engine wrapping the ocrs library
pub struct OcrsEngine {
    engine: OcrsOcrEngine,
    languages: Vec<String>,
}

impl OcrsEngine {
    /// Load models (downloading them if needed) and build the engine
    pub fn new(config: &Config) -> Result<Self, OcrError> {
        check_languages(&config.languages, SUPPORTED_LANGUAGES)?;

        if config.use_accelerator {
            tracing::warn!("ocrs runs on CPU only, ignoring use_accelerator");
        }

        // Load models (will download if not cached)
        let detection_model_path =
            ensure_model_downloaded(DETECTION_MODEL_URL, "text-detection.rten")?;
        let recognition_model_path =
            ensure_model_downloaded(RECOGNITION_MODEL_URL, "text-recognition.rten")?;

        let detection_model = Model::load_file(&detection_model_path).map_err(|e| {
            OcrError::InitializationError(format!("Failed to load detection model: {}", e))
        })?;
        let recognition_model = Model::load_file(&recognition_model_path).map_err(|e| {
            OcrError::InitializationError(format!("Failed to load recognition model: {}", e))
        })?;

        let engine = OcrsOcrEngine::new(OcrEngineParams {
            detection_model: Some(detection_model),
            recognition_model: Some(recognition_model),
            decode_method: DecodeMethod::Greedy,
            ..Default::default()
        })
        .map_err(|e| {
            OcrError::InitializationError(format!("Failed to create OCR engine: {}", e))
        })?;

        tracing::info!("ocrs engine initialized successfully");

        Ok(Self {
            engine,
            languages: config.languages.clone(),
        })
    }
}

impl TextRecognizer for OcrsEngine {
    fn name(&self) -> &'static str {
        "ocrs"
    }

    fn description(&self) -> &'static str {
        "Pure Rust OCR engine - fast, no system dependencies required"
    }

    /// One detection per text line, top to bottom as ocrs orders them
    fn recognize(&self, image: &NormalizedImage) -> Result<Vec<RawDetection>, OcrError> {
        let rgb = image.as_rgb();

        // HWC RGB8, which is what ImageSource::from_bytes expects
        let img_source = ImageSource::from_bytes(rgb.as_raw(), rgb.dimensions()).map_err(|e| {
            OcrError::RecognitionError(format!("Failed to create image source: {}", e))
        })?;

        let ocr_input = self
            .engine
            .prepare_input(img_source)
            .map_err(|e| OcrError::RecognitionError(format!("Failed to prepare input: {}", e)))?;

        let word_rects = self
            .engine
            .detect_words(&ocr_input)
            .map_err(|e| OcrError::RecognitionError(format!("Failed to detect words: {}", e)))?;

        let line_rects = self.engine.find_text_lines(&ocr_input, &word_rects);

        let line_texts = self
            .engine
            .recognize_text(&ocr_input, &line_rects)
            .map_err(|e| OcrError::RecognitionError(format!("Failed to recognize text: {}", e)))?;

        let detections = line_texts
            .iter()
            .filter_map(|line| line.as_ref())
            .map(|line| {
                let text = line
                    .words()
                    .map(|word| word.to_string())
                    .collect::<Vec<_>>()
                    .join(" ");

                let rect = line.bounding_rect();
                let region = Region {
                    x: rect.left(),
                    y: rect.top(),
                    width: (rect.right() - rect.left()).max(0) as u32,
                    height: (rect.bottom() - rect.top()).max(0) as u32,
                };

                // ocrs reports no scores, so estimate from the text itself
                let confidence = line_confidence(&text) as f64;

                RawDetection {
                    region,
                    text,
                    confidence,
                }
            })
            .collect();

        Ok(detections)
    }

    fn supported_languages(&self) -> Vec<String> {
        self.languages.clone()
    }
}

/// Estimate how plausible a recognized line is, in [0, 1]
///
/// ocrs reports no scores, so lines are judged on their text alone: garbled
/// recognition tends to produce symbol soup, long runs of one glyph, or
/// lines made of single-character fragments.
fn line_confidence(text: &str) -> f32 {
    let glyphs: Vec<char> = text.chars().filter(|c| !c.is_whitespace()).collect();
    if glyphs.is_empty() {
        return 0.0;
    }

    let total = glyphs.len() as f32;
    let alnum_share = glyphs.iter().filter(|c| c.is_alphanumeric()).count() as f32 / total;
    let symbol_share = glyphs
        .iter()
        .filter(|c| !c.is_alphanumeric() && !c.is_ascii_punctuation())
        .count() as f32
        / total;
    let character_score = (alnum_share * 1.25).min(1.0) * (1.0 - (symbol_share * 5.0).min(1.0));

    let tokens: Vec<&str> = text.split_whitespace().collect();
    let fragment_penalty = if tokens.len() > 1 {
        let fragments = tokens.iter().filter(|t| t.chars().count() == 1).count();
        0.5 * fragments as f32 / tokens.len() as f32
    } else {
        0.0
    };

    let repeat_penalty = match longest_run(&glyphs) {
        0..=3 => 0.0,
        4..=6 => 0.2,
        _ => 0.5,
    };

    (character_score - fragment_penalty - repeat_penalty).clamp(0.0, 1.0)
}

/// Length of the longest run of one repeated glyph
fn longest_run(glyphs: &[char]) -> usize {
    glyphs
        .chunk_by(|a, b| a == b)
        .map(|run| run.len())
        .max()
        .unwrap_or(0)
}

// ============================================================================
// Model download
// ============================================================================

/// Models are a few MB each; anything far larger is not a model
const MAX_MODEL_BYTES: u64 = 64 * 1024 * 1024;

/// Return the cached model path, downloading it on first use
fn ensure_model_downloaded(url: &str, filename: &str) -> Result<PathBuf, OcrError> {
    let cache_dir = dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("ocr-preprocess-server");

    std::fs::create_dir_all(&cache_dir).map_err(|e| {
        OcrError::InitializationError(format!("Failed to create cache directory: {}", e))
    })?;

    let model_path = cache_dir.join(filename);
    if model_path.exists() {
        tracing::info!("Using cached model from {:?}", model_path);
        return Ok(model_path);
    }

    tracing::info!("Downloading {} (this may take a moment)...", filename);
    download_file(url, &model_path)?;
    tracing::info!("Downloaded {} to {:?}", filename, model_path);

    Ok(model_path)
}

/// Download into a `.part` file and rename, so an interrupted download is
/// never mistaken for a cached model
fn download_file(url: &str, path: &Path) -> Result<(), OcrError> {
    let response = ureq::get(url)
        .call()
        .map_err(|e| OcrError::InitializationError(format!("Failed to download model: {}", e)))?;

    let buffer = response
        .into_body()
        .with_config()
        .limit(MAX_MODEL_BYTES)
        .read_to_vec()
        .map_err(|e| {
            OcrError::InitializationError(format!("Failed to read response body: {}", e))
        })?;

    let partial = path.with_extension("part");
    File::create(&partial)
        .and_then(|mut file| file.write_all(&buffer))
        .and_then(|_| std::fs::rename(&partial, path))
        .map_err(|e| {
            OcrError::InitializationError(format!("Failed to store model {:?}: {}", path, e))
        })?;

    Ok(())
}
