//! Borrowed views over the strided planes of a camera image.
//!
//! A `PlaneDescriptor` is what the host hands over: an optional buffer (the
//! host buffer pointer may be null) plus signed strides straight from the
//! Java side. `PlaneView` is the validated form the converters work with;
//! once built, every `offset()` it yields is inside the buffer.

use serde::{Deserialize, Serialize};

use crate::errors::FrameError;

/// Raw plane as delivered by the host. Valid only for the duration of one
/// conversion call.
#[derive(Debug, Clone, Copy)]
pub struct PlaneDescriptor<'a> {
    pub data: Option<&'a [u8]>,
    pub row_stride: i32,
    pub pixel_stride: i32,
}

impl<'a> PlaneDescriptor<'a> {
    pub fn new(data: &'a [u8], row_stride: i32, pixel_stride: i32) -> Self {
        Self {
            data: Some(data),
            row_stride,
            pixel_stride,
        }
    }

    /// A plane whose buffer pointer was null.
    pub fn null(row_stride: i32, pixel_stride: i32) -> Self {
        Self {
            data: None,
            row_stride,
            pixel_stride,
        }
    }
}

/// Which chroma plane carries U.
///
/// Android documents planes as Y, U, V but some devices deliver the chroma
/// planes swapped.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PlaneOrder {
    #[default]
    Yuv,
    Yvu,
}

/// Validated view over a plane covering `width` x `height` samples.
#[derive(Debug, Clone, Copy)]
pub struct PlaneView<'a> {
    data: &'a [u8],
    row_stride: usize,
    pixel_stride: usize,
    width: usize,
    height: usize,
}

impl<'a> PlaneView<'a> {
    pub fn new(
        desc: &PlaneDescriptor<'a>,
        width: usize,
        height: usize,
    ) -> Result<Self, FrameError> {
        let Some(data) = desc.data else {
            return Err(FrameError::Precondition("plane buffer is null".into()));
        };
        if width == 0 || height == 0 {
            return Err(FrameError::Precondition(format!(
                "invalid plane dims: {width} x {height}"
            )));
        }
        if desc.row_stride <= 0 || desc.pixel_stride <= 0 {
            return Err(FrameError::Precondition(format!(
                "invalid plane strides: row={} pixel={}",
                desc.row_stride, desc.pixel_stride
            )));
        }
        let row_stride = desc.row_stride as usize;
        let pixel_stride = desc.pixel_stride as usize;

        // Bytes touched by one row, from its first sample to its last.
        let row_span = (width - 1)
            .checked_mul(pixel_stride)
            .and_then(|n| n.checked_add(1))
            .ok_or_else(|| FrameError::Precondition("plane row span overflows".into()))?;
        if height > 1 && row_span > row_stride {
            return Err(FrameError::Precondition(format!(
                "row stride {row_stride} shorter than row span {row_span}"
            )));
        }

        // The last row is frequently delivered without its trailing padding,
        // so only the bytes actually sampled are required.
        let required = (height - 1)
            .checked_mul(row_stride)
            .and_then(|n| n.checked_add(row_span))
            .ok_or_else(|| FrameError::Precondition("plane size overflows".into()))?;
        if data.len() < required {
            return Err(FrameError::Precondition(format!(
                "plane buffer too small: {} < {required}",
                data.len()
            )));
        }

        Ok(Self {
            data,
            row_stride,
            pixel_stride,
            width,
            height,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn row_stride(&self) -> usize {
        self.row_stride
    }

    pub fn pixel_stride(&self) -> usize {
        self.pixel_stride
    }

    /// Byte offset of sample (`row`, `col`) in the source buffer.
    #[inline]
    pub fn offset(&self, row: usize, col: usize) -> usize {
        debug_assert!(row < self.height && col < self.width);
        let off = row * self.row_stride + col * self.pixel_stride;
        debug_assert!(off < self.data.len());
        off
    }

    #[inline]
    pub fn sample(&self, row: usize, col: usize) -> u8 {
        self.data[self.offset(row, col)]
    }

    /// Contiguous bytes of `row`. Only meaningful for `pixel_stride == 1`.
    pub fn row(&self, row: usize) -> &'a [u8] {
        debug_assert_eq!(self.pixel_stride, 1);
        let start = self.offset(row, 0);
        &self.data[start..start + self.width]
    }

    /// Copy this plane into `dst`, tightly packed (`width` bytes per row).
    pub fn copy_packed(&self, dst: &mut [u8]) {
        debug_assert_eq!(dst.len(), self.width * self.height);
        if self.pixel_stride == 1 {
            for (row, out) in dst.chunks_exact_mut(self.width).enumerate() {
                out.copy_from_slice(self.row(row));
            }
        } else {
            for (row, out) in dst.chunks_exact_mut(self.width).enumerate() {
                for (col, px) in out.iter_mut().enumerate() {
                    *px = self.sample(row, col);
                }
            }
        }
    }
}
