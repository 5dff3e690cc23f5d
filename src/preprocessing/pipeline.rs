use crate::config::PreprocessConfig;
use crate::decoder::DecodedImage;
use crate::error::OcrError;
use image::{DynamicImage, RgbImage};
use std::time::Instant;

use super::steps;

/// Fully preprocessed bitmap handed to the recognition engine
///
/// Binarized, replicated into three identical channels, and no wider than
/// the pipeline's `max_width`.
#[derive(Debug, Clone)]
pub struct NormalizedImage {
    image: RgbImage,
}

impl NormalizedImage {
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn as_rgb(&self) -> &RgbImage {
        &self.image
    }

    /// Wrap an already-normalized bitmap
    ///
    /// Only for callers that produce binary RGB themselves, such as tests.
    pub fn from_rgb_unchecked(image: RgbImage) -> Self {
        Self { image }
    }
}

/// Timing information for a single preprocessing step
#[derive(Debug, Clone)]
pub struct StepTiming {
    pub name: String,
    pub time_ms: u64,
}

/// Result of preprocessing including timing stats
#[derive(Debug, Clone)]
pub struct PreprocessingResult {
    pub image: NormalizedImage,
    /// Total preprocessing time in milliseconds
    pub total_time_ms: u64,
    /// Individual step timings
    pub steps: Vec<StepTiming>,
}

/// Preprocessing pipeline
///
/// resize (only when too wide) -> contrast -> grayscale -> binarize -> restore
pub struct Pipeline {
    config: PreprocessConfig,
}

impl Pipeline {
    pub fn new(config: PreprocessConfig) -> Self {
        Self { config }
    }

    /// Run every step in order; either all succeed or the error is returned
    pub fn process(&self, image: DecodedImage) -> Result<PreprocessingResult, OcrError> {
        let start = Instant::now();
        let mut steps_timing = Vec::new();
        let cfg = &self.config;

        let mut img = DynamicImage::ImageRgb8(image.into_rgb());

        img = self.run_step("resize", img, &mut steps_timing, |img| {
            steps::resize::apply(img, cfg.max_width)
        })?;
        img = self.run_step("contrast", img, &mut steps_timing, |img| {
            steps::contrast::apply(img, cfg.contrast_factor)
        })?;
        img = self.run_step("grayscale", img, &mut steps_timing, steps::grayscale::apply)?;
        img = self.run_step("binarize", img, &mut steps_timing, |img| {
            steps::threshold::apply(img, cfg.binarize_threshold, cfg.binarize_method)
        })?;
        img = self.run_step("restore", img, &mut steps_timing, steps::restore::apply)?;

        let rgb = match img {
            DynamicImage::ImageRgb8(rgb) => rgb,
            other => {
                return Err(OcrError::PreprocessingError(format!(
                    "expected RGB8 output, got {:?}",
                    other.color()
                )))
            }
        };

        if rgb.width() > cfg.max_width {
            return Err(OcrError::PreprocessingError(format!(
                "output width {} exceeds max_width {}",
                rgb.width(),
                cfg.max_width
            )));
        }

        let total_time_ms = start.elapsed().as_millis() as u64;
        tracing::debug!(
            "Preprocessed to {}x{} in {}ms",
            rgb.width(),
            rgb.height(),
            total_time_ms
        );

        Ok(PreprocessingResult {
            image: NormalizedImage { image: rgb },
            total_time_ms,
            steps: steps_timing,
        })
    }

    fn run_step<F>(
        &self,
        name: &str,
        img: DynamicImage,
        timings: &mut Vec<StepTiming>,
        step_fn: F,
    ) -> Result<DynamicImage, OcrError>
    where
        F: FnOnce(DynamicImage) -> Result<DynamicImage, OcrError>,
    {
        let step_start = Instant::now();
        let result = step_fn(img)?;
        let time_ms = step_start.elapsed().as_millis() as u64;
        tracing::trace!("Step {} took {}ms", name, time_ms);
        timings.push(StepTiming {
            name: name.to_string(),
            time_ms,
        });
        Ok(result)
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new(PreprocessConfig::default())
    }
}
