use crate::config::BinarizeMethod;
use crate::error::OcrError;
use image::{DynamicImage, GrayImage, Luma};
use imageproc::contrast::otsu_level;

/// Sauvola threshold parameters
const WINDOW_SIZE: u32 = 15;
const K: f32 = 0.2;
const R: f32 = 128.0; // Dynamic range / 2

/// Reduce a grayscale image to pure black and white
///
/// With [`BinarizeMethod::Fixed`], pixels at or above `threshold` become 255
/// and all others 0. Otsu picks the global level per image instead; Sauvola
/// thresholds each pixel against its local window.
pub fn apply(
    image: DynamicImage,
    threshold: u8,
    method: BinarizeMethod,
) -> Result<DynamicImage, OcrError> {
    let gray = image.into_luma8();
    let binarized = match method {
        BinarizeMethod::Fixed => global_threshold(&gray, threshold),
        BinarizeMethod::Otsu => {
            // Otsu's level is the top of the dark class
            let level = otsu_level(&gray);
            tracing::debug!("Otsu level: {}", level);
            global_threshold(&gray, level.saturating_add(1))
        }
        BinarizeMethod::Sauvola => sauvola(&gray),
    };
    Ok(DynamicImage::ImageLuma8(binarized))
}

/// Hard global threshold, `>= level` maps to white
pub fn global_threshold(img: &GrayImage, level: u8) -> GrayImage {
    let mut out = img.clone();
    for pixel in out.pixels_mut() {
        pixel.0[0] = if pixel.0[0] >= level { 255 } else { 0 };
    }
    out
}

/// Sauvola binarization: each pixel is compared against its own level
fn sauvola(img: &GrayImage) -> GrayImage {
    let levels = sauvola_levels(img, WINDOW_SIZE / 2, K);
    let width = img.width() as usize;
    GrayImage::from_fn(img.width(), img.height(), |x, y| {
        let level = levels[y as usize * width + x as usize];
        let value = img.get_pixel(x, y).0[0] as f32;
        Luma([if value > level { 255 } else { 0 }])
    })
}

/// Row-major map of local levels `m * (1 + k * (s / R - 1))`, where `m` and
/// `s` are the mean and standard deviation of the window clipped to the image
fn sauvola_levels(img: &GrayImage, radius: u32, k: f32) -> Vec<f32> {
    let (width, height) = img.dimensions();
    let sums = WindowSums::new(img);

    let mut levels = Vec::with_capacity(width as usize * height as usize);
    for y in 0..height {
        let (top, bottom) = (y.saturating_sub(radius), (y + radius).min(height - 1));
        for x in 0..width {
            let (left, right) = (x.saturating_sub(radius), (x + radius).min(width - 1));
            let (mean, std_dev) = sums.mean_std(left, top, right, bottom);
            levels.push((mean * (1.0 + k as f64 * (std_dev / R as f64 - 1.0))) as f32);
        }
    }
    levels
}

/// Summed-area tables of pixel values and their squares
///
/// Both tables have one extra leading row and column of zeros so a window
/// sum is four lookups with no edge cases.
struct WindowSums {
    stride: usize,
    sum: Vec<f64>,
    sum_sq: Vec<f64>,
}

impl WindowSums {
    fn new(img: &GrayImage) -> Self {
        let (width, height) = (img.width() as usize, img.height() as usize);
        let stride = width + 1;
        let mut sum = vec![0.0; stride * (height + 1)];
        let mut sum_sq = vec![0.0; stride * (height + 1)];

        for (y, row) in img.rows().enumerate() {
            let (mut row_sum, mut row_sq) = (0.0, 0.0);
            for (x, pixel) in row.enumerate() {
                let v = pixel.0[0] as f64;
                row_sum += v;
                row_sq += v * v;
                let at = (y + 1) * stride + x + 1;
                sum[at] = sum[at - stride] + row_sum;
                sum_sq[at] = sum_sq[at - stride] + row_sq;
            }
        }

        Self { stride, sum, sum_sq }
    }

    /// Mean and standard deviation over the inclusive window
    fn mean_std(&self, left: u32, top: u32, right: u32, bottom: u32) -> (f64, f64) {
        let (x0, y0) = (left as usize, top as usize);
        let (x1, y1) = (right as usize + 1, bottom as usize + 1);
        let area = ((x1 - x0) * (y1 - y0)) as f64;

        let rect = |table: &[f64]| {
            table[y1 * self.stride + x1] - table[y0 * self.stride + x1]
                - table[y1 * self.stride + x0]
                + table[y0 * self.stride + x0]
        };

        let mean = rect(&self.sum) / area;
        let variance = rect(&self.sum_sq) / area - mean * mean;
        (mean, variance.max(0.0).sqrt())
    }
}
