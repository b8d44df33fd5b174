//! Post-processing: bring a rendered buffer to its exact size and crispen
//! small icons.
//!
//! Two deterministic passes, applied in this order:
//!
//! 1. **Resample** to exactly `size × size` with a Lanczos3 filter when the
//!    buffer is off-size (supersampled canvas, raster source, rounding).
//!    Nearest-neighbour is never used: legibility at 16–48 px is the point.
//! 2. **Sharpen** with a mild unsharp mask when `size <= sharpen_threshold`,
//!    restoring edge contrast the downsample softened.
//!
//! Both passes are pure functions of `(buffer, size, config)`; no I/O.

use crate::config::ConversionConfig;
use image::imageops::{self, FilterType};
use image::RgbaImage;

/// Gaussian sigma of the unsharp mask applied to small icons.
pub const SHARPEN_SIGMA: f32 = 0.5;

/// Minimum brightness difference the unsharp mask reacts to.
pub const SHARPEN_THRESHOLD: i32 = 0;

/// Resample to exactly `size × size`, then sharpen if the icon is small.
pub fn polish(image: RgbaImage, size: u32, config: &ConversionConfig) -> RgbaImage {
    let image = resample_exact(image, size);
    if size <= config.sharpen_threshold {
        sharpen(&image)
    } else {
        image
    }
}

/// Resize with Lanczos3 when the dimensions differ from `size × size`.
pub fn resample_exact(image: RgbaImage, size: u32) -> RgbaImage {
    if image.dimensions() == (size, size) {
        image
    } else {
        imageops::resize(&image, size, size, FilterType::Lanczos3)
    }
}

/// Mild unsharp mask for small icons.
pub fn sharpen(image: &RgbaImage) -> RgbaImage {
    imageops::unsharpen(image, SHARPEN_SIGMA, SHARPEN_THRESHOLD)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn checker(size: u32) -> RgbaImage {
        RgbaImage::from_fn(size, size, |x, y| {
            if (x / 4 + y / 4) % 2 == 0 {
                Rgba([64, 64, 64, 255])
            } else {
                Rgba([192, 192, 192, 255])
            }
        })
    }

    #[test]
    fn resamples_to_exact_size() {
        let c = ConversionConfig::default();
        for (from, to) in [(128, 16), (150, 48), (10, 64), (512, 180)] {
            let out = polish(RgbaImage::new(from, from), to, &c);
            assert_eq!(out.dimensions(), (to, to), "{from} → {to}");
        }
    }

    #[test]
    fn non_square_input_becomes_square() {
        let out = polish(RgbaImage::new(300, 100), 96, &ConversionConfig::default());
        assert_eq!(out.dimensions(), (96, 96));
    }

    #[test]
    fn large_exact_size_is_untouched() {
        let img = checker(64);
        let out = polish(img.clone(), 64, &ConversionConfig::default());
        assert_eq!(out, img);
    }

    #[test]
    fn small_sizes_are_sharpened() {
        let img = checker(32);
        let out = polish(img.clone(), 32, &ConversionConfig::default());
        assert_eq!(out.dimensions(), (32, 32));
        assert_ne!(out, img, "unsharp mask should alter edge pixels");
    }

    #[test]
    fn sharpen_threshold_is_configurable() {
        let img = checker(32);
        let c = ConversionConfig::builder().sharpen_threshold(16).build().unwrap();
        assert_eq!(polish(img.clone(), 32, &c), img);
    }

    #[test]
    fn polish_is_deterministic() {
        let c = ConversionConfig::default();
        let a = polish(checker(128), 16, &c);
        let b = polish(checker(128), 16, &c);
        assert_eq!(a, b);
    }

    #[test]
    fn transparency_survives() {
        let img = RgbaImage::from_pixel(128, 128, Rgba([10, 20, 30, 0]));
        let out = polish(img, 16, &ConversionConfig::default());
        assert!(out.pixels().all(|p| p[3] == 0));
    }
}
