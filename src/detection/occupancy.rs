//! Slot occupancy classification from color statistics.
//!
//! Two signals are measured per slot image: how close the center of the slot
//! is to one of the known empty-slot background colors, and how saturated the
//! whole slot is. A slot is FULL only when the background does not match and
//! the saturation is above threshold. The background check wins: a grey
//! placeholder card is not red, but it is not saturated either, so it stays
//! EMPTY and never reaches identification.

use image::RgbImage;
use std::fmt;

use crate::watcher::config::WatcherConfig;

/// Per-slot occupancy.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OccupancyState {
    /// Not classified yet
    #[default]
    Unknown,
    Empty,
    Full,
}

impl fmt::Display for OccupancyState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OccupancyState::Unknown => write!(f, "UNKNOWN"),
            OccupancyState::Empty => write!(f, "EMPTY"),
            OccupancyState::Full => write!(f, "FULL"),
        }
    }
}

/// Raw measurements behind a classification.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SlotSignals {
    /// Smallest distance from the center average to a background color.
    /// `None` when the center window is empty or the palette is.
    pub background_distance: Option<f32>,
    /// Mean HSV saturation on a 0-255 scale
    pub saturation: f32,
}

impl fmt::Display for SlotSignals {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.background_distance {
            Some(distance) => write!(f, "bg_dist={:.1} sat={:.1}", distance, self.saturation),
            None => write!(f, "bg_dist=- sat={:.1}", self.saturation),
        }
    }
}

/// Reduces slot images to EMPTY/FULL.
#[derive(Clone, Debug)]
pub struct OccupancyClassifier {
    palette: Vec<[u8; 3]>,
    tolerance: f32,
    saturation_threshold: f32,
    center_half: u32,
}

impl OccupancyClassifier {
    pub fn new(
        palette: Vec<[u8; 3]>,
        tolerance: f32,
        saturation_threshold: f32,
        center_half: u32,
    ) -> Self {
        Self {
            palette,
            tolerance,
            saturation_threshold,
            center_half,
        }
    }

    pub fn from_config(config: &WatcherConfig) -> Self {
        Self::new(
            config.background_palette(),
            config.red_color_tolerance,
            config.saturation_threshold,
            config.center_half,
        )
    }

    /// Measures both signals for a slot image.
    pub fn measure(&self, img: &RgbImage) -> SlotSignals {
        SlotSignals {
            background_distance: background_distance(img, &self.palette, self.center_half),
            saturation: mean_saturation(img),
        }
    }

    /// True if the slot center matches an empty-slot background color.
    pub fn is_background(&self, signals: &SlotSignals) -> bool {
        signals
            .background_distance
            .is_some_and(|distance| distance < self.tolerance)
    }

    /// Applies the decision policy to measured signals.
    pub fn decide(&self, signals: &SlotSignals) -> OccupancyState {
        if !self.is_background(signals) && signals.saturation > self.saturation_threshold {
            OccupancyState::Full
        } else {
            OccupancyState::Empty
        }
    }

    pub fn classify(&self, img: &RgbImage) -> OccupancyState {
        self.decide(&self.measure(img))
    }
}

/// Average RGB color of the centered window of side `2 * center_half`,
/// clamped to the image.
pub fn center_average_color(img: &RgbImage, center_half: u32) -> Option<[f32; 3]> {
    let (w, h) = img.dimensions();
    let x0 = (w / 2).saturating_sub(center_half);
    let x1 = (w / 2 + center_half).min(w);
    let y0 = (h / 2).saturating_sub(center_half);
    let y1 = (h / 2 + center_half).min(h);

    if x1 <= x0 || y1 <= y0 {
        return None;
    }

    let mut sum = [0f64; 3];
    for y in y0..y1 {
        for x in x0..x1 {
            let pixel = img.get_pixel(x, y);
            for (acc, &channel) in sum.iter_mut().zip(pixel.0.iter()) {
                *acc += channel as f64;
            }
        }
    }

    let count = ((x1 - x0) * (y1 - y0)) as f64;
    Some(sum.map(|s| (s / count) as f32))
}

/// Smallest Euclidean distance between the center average and the palette.
pub fn background_distance(img: &RgbImage, palette: &[[u8; 3]], center_half: u32) -> Option<f32> {
    let avg = center_average_color(img, center_half)?;

    palette
        .iter()
        .map(|color| {
            let dr = avg[0] - color[0] as f32;
            let dg = avg[1] - color[1] as f32;
            let db = avg[2] - color[2] as f32;
            (dr * dr + dg * dg + db * db).sqrt()
        })
        .min_by(|a, b| a.total_cmp(b))
}

/// Mean HSV saturation of the image, 0.0 (grey) to 255.0 (pure hue).
pub fn mean_saturation(img: &RgbImage) -> f32 {
    if img.width() == 0 || img.height() == 0 {
        return 0.0;
    }

    let mut total: f64 = 0.0;
    let pixel_count = (img.width() * img.height()) as f64;

    for pixel in img.pixels() {
        let max = pixel.0.iter().copied().max().unwrap_or(0) as f64;
        let min = pixel.0.iter().copied().min().unwrap_or(0) as f64;
        if max > 0.0 {
            total += (max - min) / max * 255.0;
        }
    }

    (total / pixel_count) as f32
}
