//! Upload decoding
//!
//! Turns raw upload bytes into an RGB bitmap. Whatever the source color mode,
//! the decoded image always leaves this module as 8-bit RGB.

use crate::error::OcrError;
use image::{DynamicImage, GenericImageView, Rgb, RgbImage};

/// Background used when flattening images with an alpha channel
const BACKGROUND: [u8; 3] = [255, 255, 255];

/// A decoded upload, canonicalized to 8-bit RGB
#[derive(Debug, Clone)]
pub struct DecodedImage {
    image: RgbImage,
}

impl DecodedImage {
    pub fn new(image: RgbImage) -> Self {
        Self { image }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn as_rgb(&self) -> &RgbImage {
        &self.image
    }

    pub fn into_rgb(self) -> RgbImage {
        self.image
    }
}

/// Decode an upload into an RGB bitmap
pub fn decode(bytes: &[u8]) -> Result<DecodedImage, OcrError> {
    if bytes.is_empty() {
        return Err(OcrError::EmptyInput);
    }

    let image = image::load_from_memory(bytes).map_err(|e| OcrError::DecodeError(e.to_string()))?;

    let (width, height) = image.dimensions();
    tracing::debug!(
        "Decoded {} byte upload: {}x{}, color={:?}, format={:?}",
        bytes.len(),
        width,
        height,
        image.color(),
        image::guess_format(bytes).ok()
    );

    Ok(DecodedImage::new(canonicalize(image)))
}

/// Convert any color mode to RGB8, compositing alpha onto an opaque background
fn canonicalize(image: DynamicImage) -> RgbImage {
    if !image.color().has_alpha() {
        return image.into_rgb8();
    }

    let rgba = image.into_rgba8();
    RgbImage::from_fn(rgba.width(), rgba.height(), |x, y| {
        let [r, g, b, a] = rgba.get_pixel(x, y).0;
        let alpha = a as u32;
        let blend = |c: u8, bg: u8| -> u8 {
            ((c as u32 * alpha + bg as u32 * (255 - alpha) + 127) / 255) as u8
        };
        Rgb([
            blend(r, BACKGROUND[0]),
            blend(g, BACKGROUND[1]),
            blend(b, BACKGROUND[2]),
        ])
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, ImageFormat, Luma, Rgba, RgbaImage};
    use std::io::Cursor;

    fn encode(image: DynamicImage, format: ImageFormat) -> Vec<u8> {
        let mut bytes = Vec::new();
        image.write_to(&mut Cursor::new(&mut bytes), format).unwrap();
        bytes
    }

    #[test]
    fn test_empty_input_rejected() {
        assert!(matches!(decode(&[]), Err(OcrError::EmptyInput)));
    }

    #[test]
    fn test_text_bytes_rejected_as_decode_error() {
        let result = decode(b"this is a text file renamed to .png");
        assert!(matches!(result, Err(OcrError::DecodeError(_))));
    }

    #[test]
    fn test_truncated_png_rejected() {
        let bytes = encode(
            DynamicImage::ImageRgb8(RgbImage::new(16, 16)),
            ImageFormat::Png,
        );
        let result = decode(&bytes[..bytes.len() / 2]);
        assert!(matches!(result, Err(OcrError::DecodeError(_))));
    }

    #[test]
    fn test_grayscale_png_becomes_rgb() {
        let gray = GrayImage::from_pixel(8, 4, Luma([90]));
        let decoded = decode(&encode(DynamicImage::ImageLuma8(gray), ImageFormat::Png)).unwrap();

        assert_eq!((decoded.width(), decoded.height()), (8, 4));
        assert_eq!(decoded.as_rgb().get_pixel(3, 2).0, [90, 90, 90]);
    }

    #[test]
    fn test_rgb_png_round_trips_losslessly() {
        let mut rgb = RgbImage::new(3, 1);
        rgb.put_pixel(0, 0, Rgb([255, 0, 0]));
        rgb.put_pixel(1, 0, Rgb([0, 255, 0]));
        rgb.put_pixel(2, 0, Rgb([0, 0, 255]));
        let decoded =
            decode(&encode(DynamicImage::ImageRgb8(rgb.clone()), ImageFormat::Png)).unwrap();
        assert_eq!(decoded.into_rgb(), rgb);
    }

    #[test]
    fn test_transparent_pixels_flatten_to_white() {
        let mut rgba = RgbaImage::from_pixel(2, 1, Rgba([0, 0, 0, 0]));
        rgba.put_pixel(1, 0, Rgba([10, 20, 30, 255]));
        let decoded = decode(&encode(DynamicImage::ImageRgba8(rgba), ImageFormat::Png)).unwrap();

        assert_eq!(decoded.as_rgb().get_pixel(0, 0).0, [255, 255, 255]);
        assert_eq!(decoded.as_rgb().get_pixel(1, 0).0, [10, 20, 30]);
    }

    #[test]
    fn test_half_transparent_black_blends_to_gray() {
        let rgba = RgbaImage::from_pixel(1, 1, Rgba([0, 0, 0, 128]));
        let flattened = canonicalize(DynamicImage::ImageRgba8(rgba));
        // 255 * 127 / 255 = 127
        assert_eq!(flattened.get_pixel(0, 0).0, [127, 127, 127]);
    }
}
