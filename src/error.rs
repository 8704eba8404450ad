//! Error taxonomy for the watcher pipeline.
//!
//! Only `CaptureFailure` at the retry ceiling ends the loop. Everything else
//! is logged and the affected slot, reference, or event is skipped.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WatchError {
    #[error("capture failed {consecutive}/{limit} times in a row")]
    CaptureFailure { consecutive: u32, limit: u32 },

    #[error(
        "slot {slot} at ({x}, {y}) size {width}x{height} does not fit frame {frame_width}x{frame_height}"
    )]
    OutOfBoundsSlot {
        slot: usize,
        x: i64,
        y: i64,
        width: u32,
        height: u32,
        frame_width: u32,
        frame_height: u32,
    },

    #[error("failed to load reference {path:?}: {reason}")]
    ReferenceLoad { path: PathBuf, reason: String },

    #[error("comparison failed: {reason}")]
    Comparison { reason: String },

    #[error("review of slot {slot} produced no card name")]
    ReviewAbort { slot: usize },

    #[error("hand slot {slot} is out of range")]
    InvalidHandSlot { slot: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = WatchError::CaptureFailure { consecutive: 3, limit: 5 };
        assert_eq!(err.to_string(), "capture failed 3/5 times in a row");

        let err = WatchError::ReviewAbort { slot: 2 };
        assert_eq!(err.to_string(), "review of slot 2 produced no card name");
    }
}
