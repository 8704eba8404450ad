//! Normalized cross-correlation between a candidate and a reference image.
//!
//! Both images are reduced to blurred luma before comparison. Slot crops and
//! reference art share the same card-shaped rectangle, so the reference is
//! resized to the candidate and compared at a single alignment.

use image::imageops::{self, FilterType};
use image::{GrayImage, RgbImage};

use crate::error::WatchError;

/// Luma conversion followed by a Gaussian blur to suppress compression and
/// antialiasing noise.
pub fn preprocess(img: &RgbImage, blur_sigma: f32) -> GrayImage {
    let gray = imageops::grayscale(img);
    if blur_sigma > 0.0 && gray.width() > 0 && gray.height() > 0 {
        imageops::blur(&gray, blur_sigma)
    } else {
        gray
    }
}

/// Correlation coefficient of two equally sized images, in [-1, 1].
///
/// Fails for empty images, mismatched sizes, or images without any
/// intensity variation (the coefficient is undefined there).
pub fn correlation_coefficient(a: &GrayImage, b: &GrayImage) -> Result<f32, WatchError> {
    if a.dimensions() != b.dimensions() {
        return Err(WatchError::Comparison {
            reason: format!("size mismatch {:?} vs {:?}", a.dimensions(), b.dimensions()),
        });
    }
    if a.width() == 0 || a.height() == 0 {
        return Err(WatchError::Comparison {
            reason: "empty image".to_string(),
        });
    }

    let n = (a.width() * a.height()) as f64;
    let mean_a = a.pixels().map(|p| p[0] as f64).sum::<f64>() / n;
    let mean_b = b.pixels().map(|p| p[0] as f64).sum::<f64>() / n;

    let mut cross = 0.0;
    let mut var_a = 0.0;
    let mut var_b = 0.0;
    for (pa, pb) in a.pixels().zip(b.pixels()) {
        let da = pa[0] as f64 - mean_a;
        let db = pb[0] as f64 - mean_b;
        cross += da * db;
        var_a += da * da;
        var_b += db * db;
    }

    let denom = (var_a * var_b).sqrt();
    if denom <= f64::EPSILON {
        return Err(WatchError::Comparison {
            reason: "image has no intensity variation".to_string(),
        });
    }

    Ok((cross / denom).clamp(-1.0, 1.0) as f32)
}

/// Scores a preprocessed reference against a preprocessed candidate,
/// resizing the reference to the candidate's size when they differ.
pub fn match_score(candidate: &GrayImage, reference: &GrayImage) -> Result<f32, WatchError> {
    if reference.width() == 0 || reference.height() == 0 {
        return Err(WatchError::Comparison {
            reason: "empty reference".to_string(),
        });
    }

    if candidate.dimensions() == reference.dimensions() {
        correlation_coefficient(candidate, reference)
    } else {
        let resized = imageops::resize(
            reference,
            candidate.width(),
            candidate.height(),
            FilterType::Triangle,
        );
        correlation_coefficient(candidate, &resized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Luma, Rgb};

    fn pattern(width: u32, height: u32) -> GrayImage {
        GrayImage::from_fn(width, height, |x, y| Luma([((x * 7 + y * 13) % 251) as u8]))
    }

    #[test]
    fn test_identical_images_correlate_fully() {
        let img = pattern(20, 30);
        let score = correlation_coefficient(&img, &img).unwrap();
        assert!((score - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_inverted_image_anticorrelates() {
        let img = pattern(20, 30);
        let inverted = GrayImage::from_fn(20, 30, |x, y| Luma([255 - img.get_pixel(x, y)[0]]));
        let score = correlation_coefficient(&img, &inverted).unwrap();
        assert!((score + 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_brightness_shift_does_not_matter() {
        let img = GrayImage::from_fn(10, 10, |x, y| Luma([(x * 10 + y) as u8]));
        let brighter = GrayImage::from_fn(10, 10, |x, y| Luma([(x * 10 + y) as u8 + 50]));
        let score = correlation_coefficient(&img, &brighter).unwrap();
        assert!(score > 0.999);
    }

    #[test]
    fn test_flat_image_is_comparison_failure() {
        let flat = GrayImage::from_pixel(10, 10, Luma([90]));
        let err = correlation_coefficient(&flat, &pattern(10, 10)).unwrap_err();
        assert!(matches!(err, WatchError::Comparison { .. }));
    }

    #[test]
    fn test_size_mismatch_is_comparison_failure() {
        assert!(correlation_coefficient(&pattern(10, 10), &pattern(10, 11)).is_err());
    }

    #[test]
    fn test_reference_is_resized_to_candidate() {
        let big = GrayImage::from_fn(122, 180, |x, _| Luma([(x * 2) as u8]));
        let small = GrayImage::from_fn(61, 90, |x, _| Luma([(x * 4) as u8]));

        let score = match_score(&small, &big).unwrap();
        assert!(score > 0.95, "score was {}", score);
    }

    #[test]
    fn test_preprocess_keeps_dimensions() {
        let img = RgbImage::from_pixel(61, 90, Rgb([200, 10, 10]));
        let gray = preprocess(&img, 0.8);
        assert_eq!(gray.dimensions(), (61, 90));

        let unblurred = preprocess(&img, 0.0);
        assert_eq!(unblurred.dimensions(), (61, 90));
    }
}
