//! Debug view: the frame with every slot boxed by state and labelled with
//! the last card identified there.

use image::imageops::{self, FilterType};
use image::{Rgb, RgbImage};

use super::occupancy::OccupancyState;

const FULL_COLOR: Rgb<u8> = Rgb([0, 255, 0]);
const EMPTY_COLOR: Rgb<u8> = Rgb([255, 0, 0]);
const LABEL_COLOR: Rgb<u8> = Rgb([255, 255, 255]);
const BOX_THICKNESS: i64 = 2;
/// Gap between the label baseline and the slot's top edge
const LABEL_OFFSET: i64 = 10;
/// Pixels per font cell
const LABEL_SCALE: i64 = 2;

const GLYPH_WIDTH: i64 = 3;
const GLYPH_HEIGHT: i64 = 5;

/// One slot as drawn on the debug view. Coordinates are frame-relative.
#[derive(Debug, Clone, PartialEq)]
pub struct SlotMark {
    pub id: usize,
    pub x: i64,
    pub y: i64,
    pub state: OccupancyState,
    pub identity: Option<String>,
}

impl SlotMark {
    pub fn label(&self) -> String {
        format!("S{}: {}", self.id, self.identity.as_deref().unwrap_or("?"))
    }
}

/// Draws the slot boxes and labels on a copy of `frame` and scales the
/// result by `scale`.
pub fn render_debug_view(
    frame: &RgbImage,
    marks: &[SlotMark],
    card_width: u32,
    card_height: u32,
    scale: f32,
) -> RgbImage {
    let mut view = frame.clone();

    for mark in marks {
        let color = match mark.state {
            OccupancyState::Full => FULL_COLOR,
            _ => EMPTY_COLOR,
        };
        draw_box(&mut view, mark.x, mark.y, card_width as i64, card_height as i64, color);

        let text_top = mark.y - LABEL_OFFSET - GLYPH_HEIGHT * LABEL_SCALE;
        draw_text(&mut view, mark.x, text_top, &mark.label(), LABEL_COLOR);
    }

    if scale <= 0.0 || (scale - 1.0).abs() < f32::EPSILON {
        return view;
    }
    let width = ((view.width() as f32 * scale) as u32).max(1);
    let height = ((view.height() as f32 * scale) as u32).max(1);
    imageops::resize(&view, width, height, FilterType::Triangle)
}

fn put_pixel(img: &mut RgbImage, x: i64, y: i64, color: Rgb<u8>) {
    if x >= 0 && y >= 0 && x < img.width() as i64 && y < img.height() as i64 {
        img.put_pixel(x as u32, y as u32, color);
    }
}

fn fill_rect(img: &mut RgbImage, x: i64, y: i64, width: i64, height: i64, color: Rgb<u8>) {
    for py in y..y + height {
        for px in x..x + width {
            put_pixel(img, px, py, color);
        }
    }
}

/// Hollow rectangle, clipped to the image.
fn draw_box(img: &mut RgbImage, x: i64, y: i64, width: i64, height: i64, color: Rgb<u8>) {
    let t = BOX_THICKNESS;
    fill_rect(img, x, y, width, t, color);
    fill_rect(img, x, y + height - t, width, t, color);
    fill_rect(img, x, y, t, height, color);
    fill_rect(img, x + width - t, y, t, height, color);
}

fn draw_text(img: &mut RgbImage, x: i64, y: i64, text: &str, color: Rgb<u8>) {
    let advance = (GLYPH_WIDTH + 1) * LABEL_SCALE;
    for (i, c) in text.chars().enumerate() {
        let origin_x = x + i as i64 * advance;
        for (row, bits) in glyph(c).iter().enumerate() {
            for col in 0..GLYPH_WIDTH {
                if bits & (0b100 >> col) != 0 {
                    fill_rect(
                        img,
                        origin_x + col * LABEL_SCALE,
                        y + row as i64 * LABEL_SCALE,
                        LABEL_SCALE,
                        LABEL_SCALE,
                        color,
                    );
                }
            }
        }
    }
}

/// 3x5 cells, one row per byte, leftmost column in bit 2. Lowercase draws
/// as uppercase; anything unknown draws as '?'.
fn glyph(c: char) -> [u8; 5] {
    match c.to_ascii_uppercase() {
        'A' => [0b010, 0b101, 0b111, 0b101, 0b101],
        'B' => [0b110, 0b101, 0b110, 0b101, 0b110],
        'C' => [0b011, 0b100, 0b100, 0b100, 0b011],
        'D' => [0b110, 0b101, 0b101, 0b101, 0b110],
        'E' => [0b111, 0b100, 0b110, 0b100, 0b111],
        'F' => [0b111, 0b100, 0b110, 0b100, 0b100],
        'G' => [0b011, 0b100, 0b101, 0b101, 0b011],
        'H' => [0b101, 0b101, 0b111, 0b101, 0b101],
        'I' => [0b111, 0b010, 0b010, 0b010, 0b111],
        'J' => [0b001, 0b001, 0b001, 0b101, 0b010],
        'K' => [0b101, 0b101, 0b110, 0b101, 0b101],
        'L' => [0b100, 0b100, 0b100, 0b100, 0b111],
        'M' => [0b101, 0b111, 0b111, 0b101, 0b101],
        'N' => [0b110, 0b101, 0b101, 0b101, 0b101],
        'O' => [0b010, 0b101, 0b101, 0b101, 0b010],
        'P' => [0b110, 0b101, 0b110, 0b100, 0b100],
        'Q' => [0b010, 0b101, 0b101, 0b110, 0b011],
        'R' => [0b110, 0b101, 0b110, 0b101, 0b101],
        'S' => [0b011, 0b100, 0b010, 0b001, 0b110],
        'T' => [0b111, 0b010, 0b010, 0b010, 0b010],
        'U' => [0b101, 0b101, 0b101, 0b101, 0b111],
        'V' => [0b101, 0b101, 0b101, 0b101, 0b010],
        'W' => [0b101, 0b101, 0b111, 0b111, 0b101],
        'X' => [0b101, 0b101, 0b010, 0b101, 0b101],
        'Y' => [0b101, 0b101, 0b010, 0b010, 0b010],
        'Z' => [0b111, 0b001, 0b010, 0b100, 0b111],
        '0' => [0b111, 0b101, 0b101, 0b101, 0b111],
        '1' => [0b010, 0b110, 0b010, 0b010, 0b111],
        '2' => [0b110, 0b001, 0b010, 0b100, 0b111],
        '3' => [0b110, 0b001, 0b010, 0b001, 0b110],
        '4' => [0b101, 0b101, 0b111, 0b001, 0b001],
        '5' => [0b111, 0b100, 0b110, 0b001, 0b110],
        '6' => [0b011, 0b100, 0b111, 0b101, 0b111],
        '7' => [0b111, 0b001, 0b010, 0b010, 0b010],
        '8' => [0b111, 0b101, 0b111, 0b101, 0b111],
        '9' => [0b111, 0b101, 0b111, 0b001, 0b110],
        ' ' => [0; 5],
        ':' => [0b000, 0b010, 0b000, 0b010, 0b000],
        '-' => [0b000, 0b000, 0b111, 0b000, 0b000],
        '.' => [0b000, 0b000, 0b000, 0b000, 0b010],
        '\'' => [0b010, 0b010, 0b000, 0b000, 0b000],
        _ => [0b110, 0b001, 0b010, 0b000, 0b010],
    }
}
