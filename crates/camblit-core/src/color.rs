//! I420 → RGBA conversion (ITU-R BT.601).
//!
//! All arithmetic is 20-bit fixed point so the output is reproducible
//! byte-for-byte across platforms.

use serde::{Deserialize, Serialize};

use crate::errors::FrameError;
use crate::i420::PackedYuv420;

const SHIFT: u32 = 20;
const HALF: i32 = 1 << (SHIFT - 1);

// Video range: Y in [16, 235], chroma in [16, 240].
const LIMITED_CY: i32 = 1_220_542;
const LIMITED_CVR: i32 = 1_673_527;
const LIMITED_CVG: i32 = -852_492;
const LIMITED_CUG: i32 = -409_993;
const LIMITED_CUB: i32 = 2_116_026;

// Full range (JFIF): R = Y + 1.402 V', G = Y - 0.344136 U' - 0.714136 V', B = Y + 1.772 U'
const FULL_CVR: i32 = 1_470_104;
const FULL_CVG: i32 = -748_826;
const FULL_CUG: i32 = -360_853;
const FULL_CUB: i32 = 1_858_077;

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ColorRange {
    #[default]
    Limited,
    Full,
}

impl ColorRange {
    /// Convert one YUV sample to RGB.
    #[inline]
    pub fn to_rgb(self, y: u8, u: u8, v: u8) -> [u8; 3] {
        let u = i32::from(u) - 128;
        let v = i32::from(v) - 128;
        let (y, cvr, cvg, cug, cub) = match self {
            ColorRange::Limited => (
                (i32::from(y) - 16).max(0) * LIMITED_CY,
                LIMITED_CVR,
                LIMITED_CVG,
                LIMITED_CUG,
                LIMITED_CUB,
            ),
            ColorRange::Full => (i32::from(y) << SHIFT, FULL_CVR, FULL_CVG, FULL_CUG, FULL_CUB),
        };
        [
            saturate((y + HALF + cvr * v) >> SHIFT),
            saturate((y + HALF + cvg * v + cug * u) >> SHIFT),
            saturate((y + HALF + cub * u) >> SHIFT),
        ]
    }
}

#[inline]
fn saturate(x: i32) -> u8 {
    x.clamp(0, 255) as u8
}

/// Tightly packed RGBA image, row-major, 4 bytes per pixel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RgbaFrame {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl RgbaFrame {
    /// A transparent black frame.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![0u8; width * height * 4],
        }
    }

    pub fn from_raw(width: usize, height: usize, data: Vec<u8>) -> Result<Self, FrameError> {
        let expected = width
            .checked_mul(height)
            .and_then(|n| n.checked_mul(4))
            .ok_or_else(|| FrameError::Transform("rgba size overflows".into()))?;
        if data.len() != expected {
            return Err(FrameError::Transform(format!(
                "rgba buffer is {} bytes, expected {expected}",
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    pub fn pixel(&self, x: usize, y: usize) -> [u8; 4] {
        let i = (y * self.width + x) * 4;
        [self.data[i], self.data[i + 1], self.data[i + 2], self.data[i + 3]]
    }

    pub fn set_pixel(&mut self, x: usize, y: usize, rgba: [u8; 4]) {
        let i = (y * self.width + x) * 4;
        self.data[i..i + 4].copy_from_slice(&rgba);
    }
}

/// Convert a packed I420 buffer to RGBA.
pub fn yuv420_to_rgba(packed: &PackedYuv420, range: ColorRange) -> Result<RgbaFrame, FrameError> {
    let (w, h) = (packed.width(), packed.height());
    if w == 0 || h == 0 {
        return Err(FrameError::Transform(format!("invalid dims: {w} x {h}")));
    }
    let expected = PackedYuv420::packed_len(w, h)
        .ok_or_else(|| FrameError::Transform("packed size overflows".into()))?;
    if packed.as_bytes().len() != expected {
        return Err(FrameError::Transform(format!(
            "packed buffer is {} bytes, expected {expected} for {w} x {h}",
            packed.as_bytes().len()
        )));
    }

    let cw = packed.chroma_width();
    let (y_plane, u_plane, v_plane) = (packed.y(), packed.u(), packed.v());
    let mut data = vec![0u8; w * h * 4];

    for (row, out_row) in data.chunks_exact_mut(w * 4).enumerate() {
        let y_row = &y_plane[row * w..(row + 1) * w];
        let c_off = (row / 2) * cw;
        for (col, px) in out_row.chunks_exact_mut(4).enumerate() {
            let ci = c_off + col / 2;
            let [r, g, b] = range.to_rgb(y_row[col], u_plane[ci], v_plane[ci]);
            px.copy_from_slice(&[r, g, b, 255]);
        }
    }

    RgbaFrame::from_raw(w, h, data)
}
