//! CPU overlay rendering for the streamed feed: skeleton polyline, joint
//! markers, and a small bitmap-font HUD with angle, count, and stage.

use image::{codecs::jpeg::JpegEncoder, ImageBuffer, ImageError, Rgb, RgbImage};

use crate::capture::CapturedFrame;
use crate::pose::{Joint, LandmarkSet};

// MediaPipe-style landmark palette.
const JOINT_COLOR: Rgb<u8> = Rgb([245, 117, 66]);
const BONE_COLOR: Rgb<u8> = Rgb([245, 66, 230]);
const TEXT_COLOR: Rgb<u8> = Rgb([255, 255, 255]);
const TEXT_BACKDROP: Rgb<u8> = Rgb([0, 0, 0]);

/// Left-side joint chain drawn as the skeleton overlay.
const SKELETON: [(Joint, Joint); 5] = [
    (Joint::Wrist, Joint::Elbow),
    (Joint::Elbow, Joint::Shoulder),
    (Joint::Shoulder, Joint::Hip),
    (Joint::Hip, Joint::Knee),
    (Joint::Knee, Joint::Ankle),
];

pub struct Hud<'a> {
    pub exercise: &'a str,
    pub count: u32,
    pub stage: &'a str,
    pub angle: Option<f32>,
}

/// Render the annotated frame. Landmarks are in normalized coordinates and
/// scaled to the frame size; a frame with no detection still gets the HUD.
pub fn render(frame: &CapturedFrame, landmarks: Option<&LandmarkSet>, hud: &Hud<'_>) -> RgbImage {
    let mut image = frame.image.to_rgb8();
    let width = image.width() as f32;
    let height = image.height() as f32;

    if let Some(set) = landmarks {
        for (from, to) in SKELETON {
            let a = set.point(from);
            let b = set.point(to);
            draw_segment(
                &mut image,
                (a.x * width) as i32,
                (a.y * height) as i32,
                (b.x * width) as i32,
                (b.y * height) as i32,
                BONE_COLOR,
            );
        }
        for joint in [
            Joint::Wrist,
            Joint::Elbow,
            Joint::Shoulder,
            Joint::Hip,
            Joint::Knee,
            Joint::Ankle,
        ] {
            let p = set.point(joint);
            draw_marker(
                &mut image,
                (p.x * width) as i32,
                (p.y * height) as i32,
                JOINT_COLOR,
            );
        }
    }

    let angle_line = match hud.angle {
        Some(degrees) => format!("ANGLE: {degrees:.1}"),
        None => "ANGLE: --".to_string(),
    };
    let count_line = format!("{}: {}", hud.exercise, hud.count);
    let stage_line = format!("STAGE: {}", hud.stage);
    for (row, line) in [angle_line, count_line, stage_line].iter().enumerate() {
        draw_hud_line(&mut image, 10, 30 + 30 * row as i32, line);
    }

    image
}

pub fn encode_jpeg(image: &RgbImage, quality: u8) -> Result<Vec<u8>, ImageError> {
    let mut buffer = Vec::new();
    JpegEncoder::new_with_quality(&mut buffer, quality.clamp(1, 100)).encode_image(image)?;
    Ok(buffer)
}

fn draw_hud_line(image: &mut RgbImage, x: i32, y: i32, text: &str) {
    let text_width = text.chars().count() as i32 * 6;
    fill_rect(image, x - 2, y - 1, x + text_width + 2, y + 8, TEXT_BACKDROP);
    draw_label(image, x, y, text, TEXT_COLOR);
}

fn draw_segment(image: &mut RgbImage, x0: i32, y0: i32, x1: i32, y1: i32, color: Rgb<u8>) {
    let steps = (x1 - x0).abs().max((y1 - y0).abs());
    if steps == 0 {
        put_thick_pixel(image, x0, y0, color);
        return;
    }
    for i in 0..=steps {
        let t = i as f32 / steps as f32;
        let x = x0 as f32 + (x1 - x0) as f32 * t;
        let y = y0 as f32 + (y1 - y0) as f32 * t;
        put_thick_pixel(image, x.round() as i32, y.round() as i32, color);
    }
}

fn put_thick_pixel(image: &mut RgbImage, x: i32, y: i32, color: Rgb<u8>) {
    for dy in 0..2 {
        for dx in 0..2 {
            put_pixel_clipped(image, x + dx, y + dy, color);
        }
    }
}

fn draw_marker(image: &mut RgbImage, x: i32, y: i32, color: Rgb<u8>) {
    fill_rect(image, x - 2, y - 2, x + 2, y + 2, color);
}

fn fill_rect(
    image: &mut ImageBuffer<Rgb<u8>, Vec<u8>>,
    left: i32,
    top: i32,
    right: i32,
    bottom: i32,
    color: Rgb<u8>,
) {
    let width = image.width() as i32;
    let height = image.height() as i32;
    let left = left.clamp(0, width.saturating_sub(1));
    let right = right.clamp(0, width.saturating_sub(1));
    let top = top.clamp(0, height.saturating_sub(1));
    let bottom = bottom.clamp(0, height.saturating_sub(1));

    for y in top..=bottom {
        for x in left..=right {
            *image.get_pixel_mut(x as u32, y as u32) = color;
        }
    }
}

fn put_pixel_clipped(image: &mut RgbImage, x: i32, y: i32, color: Rgb<u8>) {
    if x >= 0 && y >= 0 && x < image.width() as i32 && y < image.height() as i32 {
        *image.get_pixel_mut(x as u32, y as u32) = color;
    }
}

fn draw_label(image: &mut RgbImage, mut x: i32, y: i32, text: &str, color: Rgb<u8>) {
    let height = image.height() as i32;
    for ch in text.chars().flat_map(|c| c.to_uppercase()) {
        if let Some(glyph) = glyph_bits(ch) {
            for (row, pattern) in glyph.iter().enumerate() {
                let py = y + row as i32;
                if py < 0 || py >= height {
                    continue;
                }
                for col in 0..5 {
                    if (pattern >> (4 - col)) & 1 == 1 {
                        put_pixel_clipped(image, x + col, py, color);
                    }
                }
            }
        }
        x += 6;
    }
}

fn glyph_bits(ch: char) -> Option<[u8; 7]> {
    match ch {
        'A' => Some([0b01110, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001]),
        'B' => Some([0b11110, 0b10001, 0b10001, 0b11110, 0b10001, 0b10001, 0b11110]),
        'C' => Some([0b01110, 0b10001, 0b10000, 0b10000, 0b10000, 0b10001, 0b01110]),
        'D' => Some([0b11110, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b11110]),
        'E' => Some([0b11111, 0b10000, 0b11110, 0b10000, 0b10000, 0b10000, 0b11111]),
        'F' => Some([0b11111, 0b10000, 0b11110, 0b10000, 0b10000, 0b10000, 0b10000]),
        'G' => Some([0b01110, 0b10001, 0b10000, 0b10111, 0b10001, 0b10001, 0b01111]),
        'H' => Some([0b10001, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001]),
        'I' => Some([0b01110, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110]),
        'J' => Some([0b00111, 0b00010, 0b00010, 0b00010, 0b00010, 0b10010, 0b01100]),
        'K' => Some([0b10001, 0b10010, 0b10100, 0b11000, 0b10100, 0b10010, 0b10001]),
        'L' => Some([0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b11111]),
        'M' => Some([0b10001, 0b11011, 0b10101, 0b10101, 0b10001, 0b10001, 0b10001]),
        'N' => Some([0b10001, 0b11001, 0b10101, 0b10101, 0b10011, 0b10001, 0b10001]),
        'O' => Some([0b01110, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110]),
        'P' => Some([0b11110, 0b10001, 0b10001, 0b11110, 0b10000, 0b10000, 0b10000]),
        'Q' => Some([0b01110, 0b10001, 0b10001, 0b10001, 0b10101, 0b10010, 0b01101]),
        'R' => Some([0b11110, 0b10001, 0b10001, 0b11110, 0b10100, 0b10010, 0b10001]),
        'S' => Some([0b01111, 0b10000, 0b01110, 0b00001, 0b00001, 0b10001, 0b01110]),
        'T' => Some([0b11111, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100]),
        'U' => Some([0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110]),
        'V' => Some([0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01010, 0b00100]),
        'W' => Some([0b10001, 0b10001, 0b10001, 0b10101, 0b10101, 0b10101, 0b01010]),
        'X' => Some([0b10001, 0b10001, 0b01010, 0b00100, 0b01010, 0b10001, 0b10001]),
        'Y' => Some([0b10001, 0b10001, 0b01010, 0b00100, 0b00100, 0b00100, 0b00100]),
        'Z' => Some([0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b10000, 0b11111]),
        '0' => Some([0b01110, 0b10001, 0b10011, 0b10101, 0b11001, 0b10001, 0b01110]),
        '1' => Some([0b00100, 0b01100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110]),
        '2' => Some([0b01110, 0b10001, 0b00001, 0b00010, 0b00100, 0b01000, 0b11111]),
        '3' => Some([0b11110, 0b00001, 0b00001, 0b01110, 0b00001, 0b00001, 0b11110]),
        '4' => Some([0b00010, 0b00110, 0b01010, 0b10010, 0b11111, 0b00010, 0b00010]),
        '5' => Some([0b11111, 0b10000, 0b11110, 0b00001, 0b00001, 0b10001, 0b01110]),
        '6' => Some([0b00110, 0b01000, 0b10000, 0b11110, 0b10001, 0b10001, 0b01110]),
        '7' => Some([0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b01000, 0b01000]),
        '8' => Some([0b01110, 0b10001, 0b10001, 0b01110, 0b10001, 0b10001, 0b01110]),
        '9' => Some([0b01110, 0b10001, 0b10001, 0b01111, 0b00001, 0b00010, 0b01100]),
        ':' => Some([0b00000, 0b00100, 0b00100, 0b00000, 0b00100, 0b00100, 0b00000]),
        '.' => Some([0b00000, 0b00000, 0b00000, 0b00000, 0b00000, 0b00100, 0b00100]),
        '-' => Some([0b00000, 0b00000, 0b00000, 0b01110, 0b00000, 0b00000, 0b00000]),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exercise::angle::Point;
    use image::DynamicImage;
    use std::sync::Arc;

    fn blank_frame(width: u32, height: u32) -> CapturedFrame {
        CapturedFrame::new(DynamicImage::ImageRgb8(ImageBuffer::from_pixel(
            width,
            height,
            Rgb([10, 10, 10]),
        )))
    }

    fn landmarks() -> LandmarkSet {
        LandmarkSet {
            wrist: Point::new(0.6, 0.35),
            elbow: Point::new(0.58, 0.28),
            shoulder: Point::new(0.55, 0.22),
            hip: Point::new(0.52, 0.48),
            knee: Point::new(0.5, 0.66),
            ankle: Point::new(0.5, 0.86),
        }
    }

    #[test]
    fn render_marks_joint_pixels() {
        let frame = blank_frame(100, 100);
        let set = landmarks();
        let hud = Hud {
            exercise: "SQUAT",
            count: 3,
            stage: "straight",
            angle: Some(120.0),
        };
        let image = render(&frame, Some(&set), &hud);
        // Ankle sits clear of the HUD rows.
        let ankle = image.get_pixel(50, 86);
        assert_eq!(*ankle, JOINT_COLOR);
    }

    #[test]
    fn render_without_landmarks_keeps_frame_dimensions() {
        let frame = blank_frame(64, 48);
        let hud = Hud {
            exercise: "PULL-UP",
            count: 0,
            stage: "down",
            angle: None,
        };
        let image = render(&frame, None, &hud);
        assert_eq!((image.width(), image.height()), (64, 48));
        // Source buffer untouched; rendering works on a copy.
        assert!(Arc::strong_count(&frame.image) >= 1);
        assert_eq!(*frame.image.to_rgb8().get_pixel(0, 0), Rgb([10, 10, 10]));
    }

    #[test]
    fn jpeg_encoding_produces_a_nonempty_payload() {
        let frame = blank_frame(32, 32);
        let hud = Hud {
            exercise: "CRUNCH",
            count: 1,
            stage: "up",
            angle: Some(42.0),
        };
        let image = render(&frame, Some(&landmarks()), &hud);
        let jpeg = encode_jpeg(&image, 80).expect("encode succeeds");
        assert!(jpeg.len() > 2);
        assert_eq!(&jpeg[..2], &[0xFF, 0xD8]);
    }
}
