//! Synthetic images and in-memory collaborators shared by unit tests.

use anyhow::{anyhow, Result};
use image::{Rgb, RgbImage};
use std::collections::VecDeque;

use crate::capture::{CaptureRegion, FrameSource};
use crate::review::{OperatorConsole, ReviewRequest};
use crate::tracking::{DashboardSink, DashboardSnapshot};

/// Deterministic, textured, saturated 61x90 card art. Different seeds
/// correlate poorly with each other.
pub fn card_art(seed: u32) -> RgbImage {
    RgbImage::from_fn(61, 90, |x, y| {
        let v = ((x * (seed + 3) * 7 + y * (seed * 5 + 11) + (x * y) % (seed + 7)) % 256) as u8;
        Rgb([v, 255 - v, v.wrapping_mul(3)])
    })
}

/// 61x90 art made of 8x8 blocks of pseudo-random saturated colors. Being
/// coarse, its correlation with other images barely moves under blur.
pub fn block_art(seed: u32) -> RgbImage {
    RgbImage::from_fn(61, 90, |x, y| {
        let n = (x / 8).wrapping_mul(73856093)
            ^ (y / 8).wrapping_mul(19349663)
            ^ seed.wrapping_mul(83492791);
        let v = ((n.wrapping_mul(2654435761) >> 8) & 0xff) as u8;
        Rgb([v, 255 - v, v.wrapping_mul(3)])
    })
}

/// Per-channel mix: `weight` of `a` plus `1 - weight` of `b`.
///
/// With `block_art(1)` and `block_art(2)`, a weight of 0.4 scores about 0.56
/// against `block_art(1)` and 0.65 scores about 0.89.
pub fn blend(a: &RgbImage, b: &RgbImage, weight: f32) -> RgbImage {
    RgbImage::from_fn(a.width(), a.height(), |x, y| {
        let pa = a.get_pixel(x, y);
        let pb = b.get_pixel(x, y);
        Rgb(std::array::from_fn(|i| {
            (weight * pa[i] as f32 + (1.0 - weight) * pb[i] as f32).round() as u8
        }))
    })
}

/// Frames handed out in order; `None` once drained.
pub struct MemoryCapture {
    pub frames: VecDeque<RgbImage>,
    pub region: CaptureRegion,
    pub grabs: usize,
}

impl MemoryCapture {
    pub fn new(frames: Vec<RgbImage>) -> Self {
        let (width, height) = frames.first().map(|f| f.dimensions()).unwrap_or((0, 0));
        Self {
            frames: frames.into(),
            region: CaptureRegion {
                top: 0,
                left: 0,
                width,
                height,
            },
            grabs: 0,
        }
    }
}

impl FrameSource for MemoryCapture {
    fn grab(&mut self) -> Option<RgbImage> {
        self.grabs += 1;
        self.frames.pop_front()
    }

    fn region_info(&self) -> CaptureRegion {
        self.region
    }
}

/// Answers reviews from a fixed script and remembers every request.
/// Runs out to empty answers.
pub struct ScriptedConsole {
    answers: VecDeque<String>,
    pub prompts: Vec<ReviewRequest>,
}

impl ScriptedConsole {
    pub fn new(answers: &[&str]) -> Self {
        Self {
            answers: answers.iter().map(|a| a.to_string()).collect(),
            prompts: Vec::new(),
        }
    }
}

impl OperatorConsole for ScriptedConsole {
    fn ask(&mut self, request: &ReviewRequest) -> String {
        self.prompts.push(request.clone());
        self.answers.pop_front().unwrap_or_default()
    }
}

/// Keeps every published snapshot. Can be told to fail.
#[derive(Default)]
pub struct RecordingDashboard {
    pub published: Vec<DashboardSnapshot>,
    pub fail: bool,
}

impl DashboardSink for RecordingDashboard {
    fn publish(&mut self, snapshot: &DashboardSnapshot) -> Result<()> {
        if self.fail {
            return Err(anyhow!("dashboard unavailable"));
        }
        self.published.push(snapshot.clone());
        Ok(())
    }
}
