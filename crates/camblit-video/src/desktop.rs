//! Desktop surface: renders into an in-memory RGBA image.
//!
//! Lets the full pipeline run off-device and exports the presented frame as
//! JPEG (or base64 JPEG for web previews).

use base64::Engine;
use camblit_core::{FrameError, Surface, SurfaceBuffer, SurfaceLock};
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, RgbaImage};

#[derive(Debug, Clone)]
pub struct ImageSurface {
    image: RgbaImage,
    posts: usize,
}

impl Default for ImageSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageSurface {
    pub fn new() -> Self {
        Self {
            image: RgbaImage::new(0, 0),
            posts: 0,
        }
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn into_image(self) -> RgbaImage {
        self.image
    }

    /// Number of frames presented so far.
    pub fn posts(&self) -> usize {
        self.posts
    }

    /// Encode the last presented frame as JPEG (alpha dropped).
    pub fn encode_jpeg(&self, quality: u8) -> Result<Vec<u8>, FrameError> {
        let rgb = DynamicImage::ImageRgba8(self.image.clone()).to_rgb8();
        let mut jpeg_buf = Vec::with_capacity(rgb.as_raw().len() / 4);
        let mut encoder = JpegEncoder::new_with_quality(&mut jpeg_buf, quality);
        encoder
            .encode_image(&rgb)
            .map_err(|e| FrameError::Surface(format!("JPEG encode failed: {e}")))?;
        Ok(jpeg_buf)
    }

    pub fn encode_jpeg_base64(&self, quality: u8) -> Result<String, FrameError> {
        let jpeg = self.encode_jpeg(quality)?;
        Ok(base64::engine::general_purpose::STANDARD.encode(jpeg))
    }
}

impl Surface for ImageSurface {
    type Lock<'a>
        = ImageLock<'a>
    where
        Self: 'a;

    fn set_geometry(&mut self, width: usize, height: usize) -> Result<(), FrameError> {
        let (Ok(w), Ok(h)) = (u32::try_from(width), u32::try_from(height)) else {
            return Err(FrameError::Surface(format!(
                "geometry out of range: {width} x {height}"
            )));
        };
        if w == 0 || h == 0 {
            return Err(FrameError::Surface(format!("invalid geometry: {w} x {h}")));
        }
        if self.image.dimensions() != (w, h) {
            self.image = RgbaImage::new(w, h);
        }
        Ok(())
    }

    fn lock(&mut self) -> Result<ImageLock<'_>, FrameError> {
        Ok(ImageLock { surface: self })
    }
}

pub struct ImageLock<'a> {
    surface: &'a mut ImageSurface,
}

impl SurfaceLock for ImageLock<'_> {
    fn buffer(&mut self) -> SurfaceBuffer<'_> {
        let image = &mut self.surface.image;
        let (width, height) = (image.width() as usize, image.height() as usize);
        SurfaceBuffer {
            pixels: &mut **image,
            width,
            height,
            stride: width,
        }
    }
}

impl Drop for ImageLock<'_> {
    fn drop(&mut self) {
        self.surface.posts += 1;
    }
}
