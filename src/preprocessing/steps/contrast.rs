use crate::error::OcrError;
use image::{DynamicImage, Rgb, RgbImage};

/// Linear contrast stretch around each channel's mean
///
/// Every channel value `p` becomes `mean + factor * (p - mean)`, clamped to
/// 0-255. A factor of 1.0 leaves the image unchanged; 0.0 flattens each
/// channel to its mean.
pub fn apply(image: DynamicImage, factor: f32) -> Result<DynamicImage, OcrError> {
    let rgb = image.into_rgb8();
    let means = channel_means(&rgb);

    let enhanced = RgbImage::from_fn(rgb.width(), rgb.height(), |x, y| {
        let pixel = rgb.get_pixel(x, y).0;
        Rgb(std::array::from_fn(|c| stretch(pixel[c], means[c], factor)))
    });

    Ok(DynamicImage::ImageRgb8(enhanced))
}

fn stretch(value: u8, mean: f32, factor: f32) -> u8 {
    (mean + factor * (value as f32 - mean)).round().clamp(0.0, 255.0) as u8
}

fn channel_means(img: &RgbImage) -> [f32; 3] {
    let count = (img.width() as u64 * img.height() as u64).max(1);
    let mut sums = [0u64; 3];

    for pixel in img.pixels() {
        for (sum, value) in sums.iter_mut().zip(pixel.0) {
            *sum += value as u64;
        }
    }

    sums.map(|sum| (sum as f64 / count as f64) as f32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contrast_stretches_around_mean() {
        // Two columns: 100 and 200, mean 150
        let img = RgbImage::from_fn(2, 1, |x, _| {
            if x == 0 {
                Rgb([100, 100, 100])
            } else {
                Rgb([200, 200, 200])
            }
        });

        let result = apply(DynamicImage::ImageRgb8(img), 1.8).unwrap().into_rgb8();

        // 150 + 1.8 * -50 = 60, 150 + 1.8 * 50 = 240
        assert_eq!(result.get_pixel(0, 0).0, [60, 60, 60]);
        assert_eq!(result.get_pixel(1, 0).0, [240, 240, 240]);
    }

    #[test]
    fn test_contrast_uses_each_channel_mean() {
        let img = RgbImage::from_fn(2, 1, |x, _| {
            if x == 0 {
                Rgb([0, 100, 250])
            } else {
                Rgb([20, 100, 250])
            }
        });

        let result = apply(DynamicImage::ImageRgb8(img), 2.0).unwrap().into_rgb8();

        // red mean 10 -> 10 +/- 20 ; green and blue are uniform
        assert_eq!(result.get_pixel(0, 0).0, [0, 100, 250]);
        assert_eq!(result.get_pixel(1, 0).0, [30, 100, 250]);
    }

    #[test]
    fn test_contrast_clamps_to_byte_range() {
        let img = RgbImage::from_fn(2, 1, |x, _| {
            if x == 0 {
                Rgb([0, 0, 0])
            } else {
                Rgb([255, 255, 255])
            }
        });

        let result = apply(DynamicImage::ImageRgb8(img), 3.0).unwrap().into_rgb8();
        assert_eq!(result.get_pixel(0, 0).0, [0, 0, 0]);
        assert_eq!(result.get_pixel(1, 0).0, [255, 255, 255]);
    }

    #[test]
    fn test_contrast_factor_one_is_identity() {
        let img = RgbImage::from_fn(10, 10, |x, y| Rgb([(x * 20) as u8, (y * 10) as u8, 77]));

        let result = apply(DynamicImage::ImageRgb8(img.clone()), 1.0)
            .unwrap()
            .into_rgb8();
        assert_eq!(result, img);
    }

    #[test]
    fn test_contrast_handles_uniform_image() {
        let img = RgbImage::from_pixel(10, 10, Rgb([128, 64, 32]));

        let result = apply(DynamicImage::ImageRgb8(img), 1.8).unwrap().into_rgb8();
        assert_eq!(result.get_pixel(0, 0).0, [128, 64, 32]);
    }
}
