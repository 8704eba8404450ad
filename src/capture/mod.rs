//! Frame capture seam for the watcher.
//!
//! This module provides:
//! - The `FrameSource` trait the polling loop grabs frames through
//! - The capture-region descriptor (`CaptureRegion`)
//! - A replay backend that feeds recorded screenshots (`ReplayCapture`)

pub mod replay;

pub use replay::ReplayCapture;

use image::RgbImage;
use serde::{Deserialize, Serialize};

/// Screen rectangle covered by a captured frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureRegion {
    pub top: i64,
    pub left: i64,
    pub width: u32,
    pub height: u32,
}

/// A source of full-screen color frames.
pub trait FrameSource {
    /// Captures the current frame. `None` signals a capture failure.
    fn grab(&mut self) -> Option<RgbImage>;

    /// Describes where the captured frames sit on screen.
    fn region_info(&self) -> CaptureRegion;
}
