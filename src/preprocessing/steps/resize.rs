use crate::error::OcrError;
use image::{imageops::FilterType, DynamicImage, GenericImageView};

/// Downscale images wider than `max_width`, preserving aspect ratio
///
/// Only the height is rounded; the output width is exactly `max_width`.
/// Images that already fit are returned untouched.
pub fn apply(image: DynamicImage, max_width: u32) -> Result<DynamicImage, OcrError> {
    let (width, height) = image.dimensions();

    if width <= max_width {
        return Ok(image);
    }

    let (new_width, new_height) = target_dimensions(width, height, max_width);
    tracing::debug!(
        "Resizing {}x{} -> {}x{}",
        width,
        height,
        new_width,
        new_height
    );

    Ok(image.resize_exact(new_width, new_height, FilterType::Lanczos3))
}

/// Dimensions after scaling `width` down to `max_width`
pub fn target_dimensions(width: u32, height: u32, max_width: u32) -> (u32, u32) {
    let ratio = max_width as f64 / width as f64;
    let new_height = (height as f64 * ratio).round().max(1.0) as u32;
    (max_width, new_height)
}
