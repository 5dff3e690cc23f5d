use crate::error::OcrError;
use image::DynamicImage;

/// Replicate the single intensity channel into R, G and B
pub fn apply(image: DynamicImage) -> Result<DynamicImage, OcrError> {
    Ok(DynamicImage::ImageRgb8(image.into_rgb8()))
}
