//! One-shot frame pipeline: planes → packed I420 → RGBA → rotate →
//! overlay → locked blit.
//!
//! Nothing touches the surface until the RGBA frame is fully built, and the
//! surface lock is a guard, so it is posted on every path once acquired.

use crate::blit::blit;
use crate::color::{RgbaFrame, yuv420_to_rgba};
use crate::errors::FrameError;
use crate::i420::PackedYuv420;
use crate::plane::PlaneDescriptor;
use crate::settings::FrameSettings;
use crate::surface::{Surface, SurfaceLock};
use crate::transform::{draw_circle, rotate};

/// Build the presentable RGBA frame from the camera planes.
pub fn prepare_frame(
    settings: &FrameSettings,
    width: i32,
    height: i32,
    planes: &[PlaneDescriptor<'_>],
) -> Result<RgbaFrame, FrameError> {
    if width <= 0 || height <= 0 {
        return Err(FrameError::Precondition(format!(
            "invalid image dims: {width} x {height}"
        )));
    }
    let [luma, chroma1, chroma2, ..] = planes else {
        return Err(FrameError::Precondition(format!(
            "unexpected plane count: {}",
            planes.len()
        )));
    };

    let packed = PackedYuv420::from_planes(
        width as usize,
        height as usize,
        luma,
        chroma1,
        chroma2,
        settings.plane_order,
    )?;
    let rgba = yuv420_to_rgba(&packed, settings.color_range)?;
    let mut frame = rotate(&rgba, settings.rotation, settings.mirror);
    if let Some(style) = &settings.overlay {
        draw_circle(&mut frame, style);
    }
    Ok(frame)
}

/// Size the surface to the frame, lock it, blit, and post.
pub fn present<S: Surface>(frame: &RgbaFrame, surface: &mut S) -> Result<(), FrameError> {
    surface.set_geometry(frame.width(), frame.height())?;
    let mut lock = surface.lock()?;
    let mut buffer = lock.buffer();
    blit(frame, &mut buffer)
}

pub fn convert_and_render<S: Surface>(
    settings: &FrameSettings,
    width: i32,
    height: i32,
    planes: &[PlaneDescriptor<'_>],
    surface: &mut S,
) -> Result<(), FrameError> {
    let frame = prepare_frame(settings, width, height, planes)?;
    present(&frame, surface)
}

/// Render one frame, logging the outcome. Failed frames are dropped.
pub fn process_frame<S: Surface>(
    settings: &FrameSettings,
    width: i32,
    height: i32,
    planes: &[PlaneDescriptor<'_>],
    surface: &mut S,
) {
    match convert_and_render(settings, width, height, planes, surface) {
        Ok(()) => tracing::info!(width, height, "processFrame: rendered {width}x{height}"),
        Err(e) => tracing::error!(width, height, kind = e.kind(), "processFrame: {e}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::ColorRange;
    use crate::i420::chroma_dims;
    use crate::plane::PlaneOrder;
    use crate::surface::MemorySurface;
    use crate::transform::{OverlayStyle, Rotation};

    struct Planes {
        y: Vec<u8>,
        u: Vec<u8>,
        v: Vec<u8>,
        y_rs: i32,
        c_rs: i32,
        ps: i32,
    }

    impl Planes {
        /// Solid planes with `pad` extra bytes per row.
        fn solid(w: usize, h: usize, ps: usize, pad: usize, yuv: (u8, u8, u8)) -> Self {
            let (cw, ch) = chroma_dims(w, h);
            let y_rs = w * ps + pad;
            let c_rs = cw * ps + pad;
            Self {
                y: vec![yuv.0; y_rs * h],
                u: vec![yuv.1; c_rs * ch],
                v: vec![yuv.2; c_rs * ch],
                y_rs: y_rs as i32,
                c_rs: c_rs as i32,
                ps: ps as i32,
            }
        }

        fn descriptors(&self) -> [PlaneDescriptor<'_>; 3] {
            [
                PlaneDescriptor::new(&self.y, self.y_rs, self.ps),
                PlaneDescriptor::new(&self.u, self.c_rs, self.ps),
                PlaneDescriptor::new(&self.v, self.c_rs, self.ps),
            ]
        }
    }

    fn no_overlay() -> FrameSettings {
        FrameSettings {
            overlay: None,
            ..FrameSettings::default()
        }
    }

    #[test]
    fn test_solid_color_all_sizes_and_strides() {
        let expected = ColorRange::Limited.to_rgb(81, 90, 240);
        let settings = no_overlay();
        for (w, h) in [(1, 1), (2, 2), (5, 3), (7, 9), (16, 8)] {
            for ps in [1, 2] {
                let planes = Planes::solid(w, h, ps, 3, (81, 90, 240));
                let mut surface = MemorySurface::new(0, 0);
                convert_and_render(&settings, w as i32, h as i32, &planes.descriptors(), &mut surface)
                    .unwrap();
                // Default rotation is 90 degrees: surface is h x w.
                assert_eq!((surface.width(), surface.height()), (h, w));
                for y in 0..w {
                    for x in 0..h {
                        let px = surface.pixel(x, y);
                        assert_eq!(&px[..3], &expected[..], "{w}x{h} ps={ps} at ({x},{y})");
                        assert_eq!(px[3], 255);
                    }
                }
            }
        }
    }

    #[test]
    fn test_solid_color_outside_overlay() {
        let settings = FrameSettings::default();
        let style = OverlayStyle::default();
        let (w, h) = (48, 32);
        let planes = Planes::solid(w, h, 2, 0, (128, 128, 128));
        let mut surface = MemorySurface::new(0, 0);
        convert_and_render(&settings, w as i32, h as i32, &planes.descriptors(), &mut surface)
            .unwrap();
        // Rotated frame is 32 x 48, ring radius 4 around (16, 24).
        assert_eq!(surface.pixel(0, 0), [130, 130, 130, 255]);
        assert_eq!(surface.pixel(16, 24), [130, 130, 130, 255]);
        assert_eq!(surface.pixel(16 + 4, 24), style.color);
    }

    #[test]
    fn test_null_plane_leaves_surface_untouched() {
        let planes = Planes::solid(4, 4, 1, 0, (128, 128, 128));
        let descs = [
            PlaneDescriptor::new(&planes.y, planes.y_rs, 1),
            PlaneDescriptor::null(planes.c_rs, 1),
            PlaneDescriptor::new(&planes.v, planes.c_rs, 1),
        ];
        let mut surface = MemorySurface::fixed(4, 4, 6, 0x5A);
        let err = convert_and_render(&FrameSettings::default(), 4, 4, &descs, &mut surface)
            .unwrap_err();
        assert!(matches!(err, FrameError::Precondition(_)));
        assert!(surface.pixels().iter().all(|&b| b == 0x5A));
        assert_eq!(surface.locks(), 0);
    }

    #[test]
    fn test_bad_dims_and_plane_count() {
        let planes = Planes::solid(2, 2, 1, 0, (0, 0, 0));
        let descs = planes.descriptors();
        let mut surface = MemorySurface::new(0, 0);
        let settings = FrameSettings::default();
        assert!(convert_and_render(&settings, 0, 2, &descs, &mut surface).is_err());
        assert!(convert_and_render(&settings, 2, -1, &descs, &mut surface).is_err());
        let err = convert_and_render(&settings, 2, 2, &descs[..2], &mut surface).unwrap_err();
        assert!(err.to_string().contains("plane count"));
        assert_eq!(surface.locks(), 0);
    }

    #[test]
    fn test_lock_released_when_blit_fails() {
        let planes = Planes::solid(8, 8, 1, 0, (128, 128, 128));
        // Fixed surface too small for the frame: blit fails under the lock.
        let mut surface = MemorySurface::fixed(4, 4, 4, 0x5A);
        let err = convert_and_render(&no_overlay(), 8, 8, &planes.descriptors(), &mut surface)
            .unwrap_err();
        assert!(matches!(err, FrameError::Surface(_)));
        assert_eq!(surface.locks(), 1);
        assert_eq!(surface.posts(), 1);
        assert!(surface.pixels().iter().all(|&b| b == 0x5A));
    }

    #[test]
    fn test_lock_failure_reported() {
        let planes = Planes::solid(2, 2, 1, 0, (128, 128, 128));
        let mut surface = MemorySurface::new(0, 0);
        surface.set_fail_lock(true);
        let err = convert_and_render(&no_overlay(), 2, 2, &planes.descriptors(), &mut surface)
            .unwrap_err();
        assert_eq!(err.kind(), "surface");
        assert_eq!(surface.posts(), 0);
    }

    #[test]
    fn test_padded_surface_keeps_row_padding() {
        let planes = Planes::solid(3, 5, 1, 0, (235, 128, 128));
        let mut surface = MemorySurface::new(2, 0xCD);
        let settings = FrameSettings {
            rotation: Rotation::Deg0,
            overlay: None,
            ..FrameSettings::default()
        };
        convert_and_render(&settings, 3, 5, &planes.descriptors(), &mut surface).unwrap();
        assert_eq!(surface.stride(), 5);
        for y in 0..5 {
            for x in 0..3 {
                assert_eq!(surface.pixel(x, y), [255, 255, 255, 255]);
            }
            for x in 3..5 {
                assert_eq!(surface.pixel(x, y), [0xCD; 4]);
            }
        }
        assert_eq!(surface.posts(), 1);
    }

    #[test]
    fn test_rotation_marker_before_overlay() {
        // Luma marker at (0, 0) on a neutral grey frame.
        let (w, h) = (6, 4);
        let mut planes = Planes::solid(w, h, 1, 0, (128, 128, 128));
        planes.y[0] = 235;
        let frame = prepare_frame(&no_overlay(), w as i32, h as i32, &planes.descriptors()).unwrap();
        assert_eq!((frame.width(), frame.height()), (h, w));
        assert_eq!(frame.pixel(h - 1, 0), [255, 255, 255, 255]);
        assert_eq!(frame.pixel(0, 0), [130, 130, 130, 255]);
    }

    #[test]
    fn test_plane_order_setting_swaps_colors() {
        let planes = Planes::solid(2, 2, 1, 0, (81, 90, 240));
        let swapped = FrameSettings {
            plane_order: PlaneOrder::Yvu,
            overlay: None,
            ..FrameSettings::default()
        };
        let frame = prepare_frame(&swapped, 2, 2, &planes.descriptors()).unwrap();
        let [r, g, b] = ColorRange::Limited.to_rgb(81, 240, 90);
        assert_eq!(frame.pixel(0, 0), [r, g, b, 255]);
    }

    #[test]
    fn test_process_frame_swallows_errors() {
        let mut surface = MemorySurface::new(0, 0);
        process_frame(&FrameSettings::default(), 4, 4, &[], &mut surface);
        assert_eq!(surface.locks(), 0);
    }
}
