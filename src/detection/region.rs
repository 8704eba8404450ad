use image::RgbImage;

use crate::capture::CaptureRegion;
use crate::error::WatchError;
use crate::watcher::config::SlotConfig;

/// Crops one slot out of a full-screen frame.
///
/// The slot position is absolute; it is shifted by the capture origin before
/// cropping. A slot that does not fit entirely inside the frame (for example
/// after a resolution change) yields `WatchError::OutOfBoundsSlot`.
pub fn sample_slot(
    frame: &RgbImage,
    region: &CaptureRegion,
    slot: &SlotConfig,
    width: u32,
    height: u32,
) -> Result<RgbImage, WatchError> {
    let (frame_width, frame_height) = frame.dimensions();
    let x = slot.left - region.left;
    let y = slot.top - region.top;

    let fits = x >= 0
        && y >= 0
        && x + width as i64 <= frame_width as i64
        && y + height as i64 <= frame_height as i64;

    if !fits {
        return Err(WatchError::OutOfBoundsSlot {
            slot: slot.id,
            x,
            y,
            width,
            height,
            frame_width,
            frame_height,
        });
    }

    Ok(image::imageops::crop_imm(frame, x as u32, y as u32, width, height).to_image())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn gradient_frame(width: u32, height: u32) -> RgbImage {
        RgbImage::from_fn(width, height, |x, y| Rgb([x as u8, y as u8, 0]))
    }

    #[test]
    fn test_sample_slot_relative_to_origin() {
        let frame = gradient_frame(200, 100);
        let region = CaptureRegion { top: 50, left: 1000, width: 200, height: 100 };
        let slot = SlotConfig { id: 0, left: 1010, top: 70 };

        let img = sample_slot(&frame, &region, &slot, 30, 40).unwrap();

        assert_eq!(img.dimensions(), (30, 40));
        // Top-left pixel should be (10, 20) from the frame
        assert_eq!(img.get_pixel(0, 0)[0], 10);
        assert_eq!(img.get_pixel(0, 0)[1], 20);
    }

    #[test]
    fn test_sample_slot_touching_edge() {
        let frame = gradient_frame(100, 100);
        let slot = SlotConfig { id: 1, left: 70, top: 60 };

        let img = sample_slot(&frame, &CaptureRegion::default(), &slot, 30, 40).unwrap();
        assert_eq!(img.dimensions(), (30, 40));
    }

    #[test]
    fn test_sample_slot_out_of_bounds() {
        let frame = gradient_frame(100, 100);
        let slot = SlotConfig { id: 3, left: 80, top: 0 };

        let err = sample_slot(&frame, &CaptureRegion::default(), &slot, 30, 40).unwrap_err();
        assert!(matches!(err, WatchError::OutOfBoundsSlot { slot: 3, .. }));
    }

    #[test]
    fn test_sample_slot_left_of_origin() {
        let frame = gradient_frame(100, 100);
        let region = CaptureRegion { top: 0, left: 10, width: 100, height: 100 };
        let slot = SlotConfig { id: 0, left: 5, top: 0 };

        assert!(sample_slot(&frame, &region, &slot, 30, 40).is_err());
    }
}
