//! Geometric post-processing: fixed rotation, optional mirror, and the
//! circular marker overlay.

use serde::{Deserialize, Serialize};

use crate::color::RgbaFrame;
use crate::errors::FrameError;

/// Clockwise rotation applied to the converted frame.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(try_from = "i32", into = "i32")]
pub enum Rotation {
    Deg0,
    #[default]
    Deg90,
    Deg180,
    Deg270,
}

impl Rotation {
    pub fn from_degrees(degrees: i32) -> Result<Self, FrameError> {
        match degrees.rem_euclid(360) {
            0 => Ok(Rotation::Deg0),
            90 => Ok(Rotation::Deg90),
            180 => Ok(Rotation::Deg180),
            270 => Ok(Rotation::Deg270),
            _ => Err(FrameError::Precondition(format!(
                "unsupported rotation: {degrees}"
            ))),
        }
    }

    pub fn degrees(self) -> i32 {
        match self {
            Rotation::Deg0 => 0,
            Rotation::Deg90 => 90,
            Rotation::Deg180 => 180,
            Rotation::Deg270 => 270,
        }
    }

    /// Dimensions of a `width` x `height` frame after rotation.
    pub fn output_dims(self, width: usize, height: usize) -> (usize, usize) {
        match self {
            Rotation::Deg0 | Rotation::Deg180 => (width, height),
            Rotation::Deg90 | Rotation::Deg270 => (height, width),
        }
    }
}

impl TryFrom<i32> for Rotation {
    type Error = FrameError;

    fn try_from(degrees: i32) -> Result<Self, Self::Error> {
        Rotation::from_degrees(degrees)
    }
}

impl From<Rotation> for i32 {
    fn from(r: Rotation) -> Self {
        r.degrees()
    }
}

/// Rotate `frame` clockwise, then flip horizontally if `mirror` is set.
pub fn rotate(frame: &RgbaFrame, rotation: Rotation, mirror: bool) -> RgbaFrame {
    let (w, h) = (frame.width(), frame.height());
    if rotation == Rotation::Deg0 && !mirror {
        return frame.clone();
    }

    let (ow, oh) = rotation.output_dims(w, h);
    let src = frame.as_bytes();
    let mut out = RgbaFrame::new(ow, oh);
    let dst = out.as_bytes_mut();

    for y in 0..h {
        for x in 0..w {
            let (dx, dy) = match rotation {
                Rotation::Deg0 => (x, y),
                Rotation::Deg90 => (h - 1 - y, x),
                Rotation::Deg180 => (w - 1 - x, h - 1 - y),
                Rotation::Deg270 => (y, w - 1 - x),
            };
            let dx = if mirror { ow - 1 - dx } else { dx };
            let si = (y * w + x) * 4;
            let di = (dy * ow + dx) * 4;
            dst[di..di + 4].copy_from_slice(&src[si..si + 4]);
        }
    }

    out
}

/// Ring drawn on top of every presented frame.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct OverlayStyle {
    #[serde(default = "default_color")]
    pub color: [u8; 4],
    #[serde(default = "default_stroke_width")]
    pub stroke_width: u32,
    #[serde(default = "default_radius_divisor")]
    pub radius_divisor: u32,
}

fn default_color() -> [u8; 4] {
    [255, 0, 0, 255]
}

fn default_stroke_width() -> u32 {
    6
}

fn default_radius_divisor() -> u32 {
    8
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self {
            color: default_color(),
            stroke_width: default_stroke_width(),
            radius_divisor: default_radius_divisor(),
        }
    }
}

impl OverlayStyle {
    /// Ring radius for a frame of the given size.
    pub fn radius(&self, width: usize, height: usize) -> usize {
        if self.radius_divisor == 0 {
            return 0;
        }
        width.min(height) / self.radius_divisor as usize
    }
}

/// Draw a ring centered on the frame, radius `min(w, h) / divisor`.
pub fn draw_circle(frame: &mut RgbaFrame, style: &OverlayStyle) {
    let (w, h) = (frame.width(), frame.height());
    let r = style.radius(w, h);
    if r == 0 || style.stroke_width == 0 {
        return;
    }
    let (cx, cy) = ((w / 2) as i64, (h / 2) as i64);
    let half = i64::from(style.stroke_width / 2);
    let inner = (r as i64 - half).max(0);
    let outer = r as i64 + half;
    let (inner2, outer2) = (inner * inner, outer * outer);

    let x0 = (cx - outer).max(0);
    let x1 = (cx + outer).min(w as i64 - 1);
    let y0 = (cy - outer).max(0);
    let y1 = (cy + outer).min(h as i64 - 1);

    for y in y0..=y1 {
        let dy = y - cy;
        for x in x0..=x1 {
            let dx = x - cx;
            let d2 = dx * dx + dy * dy;
            if d2 >= inner2 && d2 <= outer2 {
                frame.set_pixel(x as usize, y as usize, style.color);
            }
        }
    }
}
