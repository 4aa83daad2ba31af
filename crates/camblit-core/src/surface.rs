//! Presentation surfaces.
//!
//! A surface is locked for exactly one blit; dropping the lock releases it
//! and presents whatever was written.

use crate::blit::SurfaceBuffer;
use crate::errors::FrameError;

/// A display target that can be resized and exclusively locked.
pub trait Surface {
    type Lock<'a>: SurfaceLock
    where
        Self: 'a;

    /// Request a buffer geometry of `width` x `height` RGBA pixels.
    fn set_geometry(&mut self, width: usize, height: usize) -> Result<(), FrameError>;

    /// Lock the next buffer for writing.
    fn lock(&mut self) -> Result<Self::Lock<'_>, FrameError>;
}

/// A locked buffer. `Drop` must unlock and post it.
pub trait SurfaceLock {
    fn buffer(&mut self) -> SurfaceBuffer<'_>;
}

/// Heap-backed surface.
///
/// Resizable surfaces reallocate on a geometry change, keeping
/// `stride_padding` extra pixels per row. Fixed surfaces ignore geometry
/// requests.
#[derive(Debug, Clone)]
pub struct MemorySurface {
    pixels: Vec<u8>,
    width: usize,
    height: usize,
    stride: usize,
    stride_padding: usize,
    fill: u8,
    resizable: bool,
    fail_lock: bool,
    locks: usize,
    posts: usize,
}

impl MemorySurface {
    /// Resizable surface, initially empty.
    pub fn new(stride_padding: usize, fill: u8) -> Self {
        Self {
            pixels: Vec::new(),
            width: 0,
            height: 0,
            stride: 0,
            stride_padding,
            fill,
            resizable: true,
            fail_lock: false,
            locks: 0,
            posts: 0,
        }
    }

    /// Surface with a fixed geometry, every byte set to `fill`.
    pub fn fixed(width: usize, height: usize, stride: usize, fill: u8) -> Self {
        Self {
            pixels: vec![fill; stride * height * 4],
            width,
            height,
            stride,
            stride_padding: stride.saturating_sub(width),
            fill,
            resizable: false,
            fail_lock: false,
            locks: 0,
            posts: 0,
        }
    }

    /// Make every subsequent `lock` fail.
    pub fn set_fail_lock(&mut self, fail: bool) {
        self.fail_lock = fail;
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Number of successful locks.
    pub fn locks(&self) -> usize {
        self.locks
    }

    /// Number of buffers posted (locks released).
    pub fn posts(&self) -> usize {
        self.posts
    }

    /// Pixel at (`x`, `y`) in surface coordinates.
    pub fn pixel(&self, x: usize, y: usize) -> [u8; 4] {
        let i = (y * self.stride + x) * 4;
        [
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        ]
    }
}

impl Surface for MemorySurface {
    type Lock<'a>
        = MemoryLock<'a>
    where
        Self: 'a;

    fn set_geometry(&mut self, width: usize, height: usize) -> Result<(), FrameError> {
        if width == 0 || height == 0 {
            return Err(FrameError::Surface(format!(
                "invalid geometry: {width} x {height}"
            )));
        }
        if !self.resizable || (width == self.width && height == self.height) {
            return Ok(());
        }
        self.width = width;
        self.height = height;
        self.stride = width + self.stride_padding;
        self.pixels = vec![self.fill; self.stride * height * 4];
        Ok(())
    }

    fn lock(&mut self) -> Result<MemoryLock<'_>, FrameError> {
        if self.fail_lock {
            return Err(FrameError::Surface("lock refused".into()));
        }
        self.locks += 1;
        Ok(MemoryLock { surface: self })
    }
}

pub struct MemoryLock<'a> {
    surface: &'a mut MemorySurface,
}

impl SurfaceLock for MemoryLock<'_> {
    fn buffer(&mut self) -> SurfaceBuffer<'_> {
        let s = &mut *self.surface;
        SurfaceBuffer {
            pixels: &mut s.pixels,
            width: s.width,
            height: s.height,
            stride: s.stride,
        }
    }
}

impl Drop for MemoryLock<'_> {
    fn drop(&mut self) {
        self.surface.posts += 1;
    }
}
