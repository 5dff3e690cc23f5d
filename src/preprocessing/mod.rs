//! Image preprocessing module for OCR enhancement
//!
//! A single configurable pipeline that turns a decoded upload into the
//! binarized bitmap the recognition engine consumes.

pub mod pipeline;
pub mod steps;

pub use pipeline::{NormalizedImage, Pipeline, PreprocessingResult, StepTiming};
