use crate::error::OcrError;
use clap::{Parser, ValueEnum};

/// How the grayscale image is reduced to two intensity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum BinarizeMethod {
    /// Global threshold taken from `binarize_threshold`
    #[default]
    Fixed,
    /// Global threshold computed per image with Otsu's method
    Otsu,
    /// Sauvola local adaptive threshold (slowest)
    Sauvola,
}

#[derive(Parser, Debug)]
#[command(name = "ocr-preprocess-server")]
#[command(about = "OCR server that binarizes uploads before text recognition")]
#[command(version)]
pub struct Args {
    /// Host address to bind to
    #[arg(long, env = "OCR_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on
    #[arg(long, env = "OCR_PORT", default_value = "8001")]
    pub port: u16,

    /// Maximum upload size in bytes (default: 50MB)
    #[arg(long, env = "OCR_MAX_FILE_SIZE", default_value = "52428800")]
    pub max_file_size: usize,

    /// Images wider than this are downscaled before recognition
    #[arg(long, env = "OCR_MAX_WIDTH", default_value = "2000")]
    pub max_width: u32,

    /// Linear contrast multiplier applied around each channel's mean
    #[arg(long, env = "OCR_CONTRAST_FACTOR", default_value = "1.8")]
    pub contrast_factor: f32,

    /// Global binarization threshold on a 0-255 scale
    #[arg(long, env = "OCR_BINARIZE_THRESHOLD", default_value = "150")]
    pub binarize_threshold: u8,

    /// Binarization method
    #[arg(long, env = "OCR_BINARIZE_METHOD", value_enum, default_value_t = BinarizeMethod::Fixed)]
    pub binarize_method: BinarizeMethod,

    /// Recognized lines at or below this confidence are dropped
    #[arg(long, env = "OCR_CONFIDENCE_THRESHOLD", default_value = "0.3")]
    pub confidence_threshold: f64,

    /// Recognition languages, fixed when the engine is initialized
    #[arg(long, env = "OCR_LANGUAGES", value_delimiter = ',', default_value = "en")]
    pub languages: Vec<String>,

    /// Ask the recognition engine for hardware acceleration
    #[arg(long, env = "OCR_USE_ACCELERATOR", default_value_t = false)]
    pub use_accelerator: bool,

    /// Seconds before an OCR request is answered with a timeout
    #[arg(long, env = "OCR_REQUEST_TIMEOUT_SECS", default_value = "120")]
    pub request_timeout_secs: u64,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "RUST_LOG", default_value = "info")]
    pub log_level: String,
}

/// Tunables of the preprocessing pipeline
#[derive(Debug, Clone, PartialEq)]
pub struct PreprocessConfig {
    pub max_width: u32,
    pub contrast_factor: f32,
    pub binarize_threshold: u8,
    pub binarize_method: BinarizeMethod,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            max_width: 2000,
            contrast_factor: 1.8,
            binarize_threshold: 150,
            binarize_method: BinarizeMethod::Fixed,
        }
    }
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub max_file_size: usize,
    pub preprocess: PreprocessConfig,
    pub confidence_threshold: f64,
    pub languages: Vec<String>,
    pub use_accelerator: bool,
    pub request_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8001,
            max_file_size: 52_428_800,
            preprocess: PreprocessConfig::default(),
            confidence_threshold: 0.3,
            languages: vec!["en".to_string()],
            use_accelerator: false,
            request_timeout_secs: 120,
        }
    }
}

impl From<Args> for Config {
    fn from(args: Args) -> Self {
        Self {
            host: args.host,
            port: args.port,
            max_file_size: args.max_file_size,
            preprocess: PreprocessConfig {
                max_width: args.max_width,
                contrast_factor: args.contrast_factor,
                binarize_threshold: args.binarize_threshold,
                binarize_method: args.binarize_method,
            },
            confidence_threshold: args.confidence_threshold,
            languages: args
                .languages
                .into_iter()
                .map(|l| l.trim().to_lowercase())
                .filter(|l| !l.is_empty())
                .collect(),
            use_accelerator: args.use_accelerator,
            request_timeout_secs: args.request_timeout_secs,
        }
    }
}

impl Config {
    /// Reject values the pipeline cannot honor
    pub fn validate(&self) -> Result<(), OcrError> {
        if self.preprocess.max_width == 0 {
            return Err(OcrError::InvalidConfig(
                "max_width must be greater than 0".to_string(),
            ));
        }
        if !self.preprocess.contrast_factor.is_finite() || self.preprocess.contrast_factor < 0.0 {
            return Err(OcrError::InvalidConfig(format!(
                "contrast_factor must be a non-negative number, got {}",
                self.preprocess.contrast_factor
            )));
        }
        if !(0.0..=1.0).contains(&self.confidence_threshold) {
            return Err(OcrError::InvalidConfig(format!(
                "confidence_threshold must be within [0, 1], got {}",
                self.confidence_threshold
            )));
        }
        if self.languages.is_empty() {
            return Err(OcrError::InvalidConfig(
                "at least one language is required".to_string(),
            ));
        }
        if self.request_timeout_secs == 0 {
            return Err(OcrError::InvalidConfig(
                "request_timeout_secs must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}
