//! Strided copy of a packed RGBA frame into a locked surface buffer.

use crate::color::RgbaFrame;
use crate::errors::FrameError;

const BYTES_PER_PIXEL: usize = 4;

/// Writable view of a locked surface. `stride` is in pixels.
#[derive(Debug)]
pub struct SurfaceBuffer<'a> {
    pub pixels: &'a mut [u8],
    pub width: usize,
    pub height: usize,
    pub stride: usize,
}

/// Copy `frame` into the top-left corner of `dst`.
///
/// Every bound is checked before the first byte is written, so a failed blit
/// leaves `dst` untouched. Bytes past `width` in each destination row are
/// never written.
pub fn blit(frame: &RgbaFrame, dst: &mut SurfaceBuffer<'_>) -> Result<(), FrameError> {
    let (w, h) = (frame.width(), frame.height());
    if w == 0 || h == 0 {
        return Err(FrameError::Surface(format!("empty frame: {w} x {h}")));
    }
    if dst.stride < dst.width {
        return Err(FrameError::Surface(format!(
            "surface stride {} smaller than its width {}",
            dst.stride, dst.width
        )));
    }
    if dst.width < w || dst.height < h {
        return Err(FrameError::Surface(format!(
            "surface {}x{} cannot hold frame {w}x{h}",
            dst.width, dst.height
        )));
    }

    let src_row = w * BYTES_PER_PIXEL;
    let dst_row = dst.stride * BYTES_PER_PIXEL;
    let required = (h - 1)
        .checked_mul(dst_row)
        .and_then(|n| n.checked_add(src_row))
        .ok_or_else(|| FrameError::Surface("surface size overflows".into()))?;
    if dst.pixels.len() < required {
        return Err(FrameError::Surface(format!(
            "surface buffer too small: {} < {required}",
            dst.pixels.len()
        )));
    }

    let src = frame.as_bytes();
    if dst.stride == w {
        dst.pixels[..src.len()].copy_from_slice(src);
    } else {
        for (row, src_line) in src.chunks_exact(src_row).enumerate() {
            let start = row * dst_row;
            dst.pixels[start..start + src_row].copy_from_slice(src_line);
        }
    }
    Ok(())
}
