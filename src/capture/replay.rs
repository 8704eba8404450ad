//! Replays recorded screenshots as a capture backend.

use anyhow::{anyhow, Context, Result};
use image::RgbImage;
use std::fs;
use std::path::{Path, PathBuf};

use super::{CaptureRegion, FrameSource};
use crate::watcher::config::CaptureOrigin;

const FRAME_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp"];

/// Feeds the image files of a directory in file-name order, one per `grab()`.
pub struct ReplayCapture {
    frames: Vec<PathBuf>,
    next: usize,
    region: CaptureRegion,
}

impl ReplayCapture {
    /// Lists the frames in `dir`. The first frame decides the reported size.
    pub fn open(dir: &Path, origin: CaptureOrigin) -> Result<Self> {
        let entries =
            fs::read_dir(dir).with_context(|| format!("Failed to read frames dir: {:?}", dir))?;

        let mut frames: Vec<PathBuf> = entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| has_frame_extension(path))
            .collect();
        frames.sort();

        let first = frames
            .first()
            .ok_or_else(|| anyhow!("No frames found in {}", dir.display()))?;
        let (width, height) = image::image_dimensions(first)
            .with_context(|| format!("Failed to read frame size: {:?}", first))?;

        crate::log(&format!(
            "[CAPTURE] Replaying {} frame(s) from {} ({}x{})",
            frames.len(),
            dir.display(),
            width,
            height
        ));

        Ok(Self {
            frames,
            next: 0,
            region: CaptureRegion {
                top: origin.top,
                left: origin.left,
                width,
                height,
            },
        })
    }

    /// Number of frames not yet replayed.
    pub fn remaining(&self) -> usize {
        self.frames.len().saturating_sub(self.next)
    }
}

impl FrameSource for ReplayCapture {
    fn grab(&mut self) -> Option<RgbImage> {
        let path = self.frames.get(self.next)?;
        self.next += 1;

        match image::open(path) {
            Ok(img) => Some(img.to_rgb8()),
            Err(e) => {
                crate::log(&format!(
                    "[CAPTURE] Failed to decode {}: {}",
                    path.display(),
                    e
                ));
                None
            }
        }
    }

    fn region_info(&self) -> CaptureRegion {
        self.region
    }
}

fn has_frame_extension(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .is_some_and(|ext| FRAME_EXTENSIONS.contains(&ext.as_str()))
}
