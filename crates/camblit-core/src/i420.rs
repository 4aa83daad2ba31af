//! Packed I420 (YUV420 planar) buffer built from three strided planes.
//!
//! Layout: `[Y: w*h][U: cw*ch][V: cw*ch]` with `cw = ceil(w/2)`,
//! `ch = ceil(h/2)`. Row and pixel strides of the source planes are removed.

use crate::errors::FrameError;
use crate::plane::{PlaneDescriptor, PlaneOrder, PlaneView};

/// Chroma plane dimensions for a 4:2:0 image, rounded up.
pub fn chroma_dims(width: usize, height: usize) -> (usize, usize) {
    (width.div_ceil(2), height.div_ceil(2))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackedYuv420 {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl PackedYuv420 {
    /// Total byte size of a packed buffer for the given dimensions.
    pub fn packed_len(width: usize, height: usize) -> Option<usize> {
        let (cw, ch) = chroma_dims(width, height);
        let luma = width.checked_mul(height)?;
        let chroma = cw.checked_mul(ch)?.checked_mul(2)?;
        luma.checked_add(chroma)
    }

    /// Wrap an already packed buffer. The length is checked later by the
    /// color transform, so malformed buffers can still be represented.
    pub fn from_raw(width: usize, height: usize, data: Vec<u8>) -> Self {
        Self {
            width,
            height,
            data,
        }
    }

    /// Normalize three camera planes into a packed buffer.
    ///
    /// `chroma1` and `chroma2` are the second and third planes as delivered;
    /// `order` decides which one is U. Every plane is validated before the
    /// destination is allocated.
    pub fn from_planes(
        width: usize,
        height: usize,
        luma: &PlaneDescriptor<'_>,
        chroma1: &PlaneDescriptor<'_>,
        chroma2: &PlaneDescriptor<'_>,
        order: PlaneOrder,
    ) -> Result<Self, FrameError> {
        if width == 0 || height == 0 {
            return Err(FrameError::Precondition(format!(
                "invalid image dims: {width} x {height}"
            )));
        }
        let (cw, ch) = chroma_dims(width, height);

        let y = PlaneView::new(luma, width, height)?;
        let c1 = PlaneView::new(chroma1, cw, ch)?;
        let c2 = PlaneView::new(chroma2, cw, ch)?;
        let (u, v) = match order {
            PlaneOrder::Yuv => (c1, c2),
            PlaneOrder::Yvu => (c2, c1),
        };

        let len = Self::packed_len(width, height)
            .ok_or_else(|| FrameError::Precondition("packed buffer size overflows".into()))?;
        let mut data = vec![0u8; len];

        let (y_dst, rest) = data.split_at_mut(width * height);
        let (u_dst, v_dst) = rest.split_at_mut(cw * ch);
        y.copy_packed(y_dst);
        u.copy_packed(u_dst);
        v.copy_packed(v_dst);

        tracing::debug!(
            width,
            height,
            y_pixel_stride = y.pixel_stride(),
            u_pixel_stride = u.pixel_stride(),
            v_pixel_stride = v.pixel_stride(),
            "packed I420 frame"
        );

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

    pub fn chroma_width(&self) -> usize {
        chroma_dims(self.width, self.height).0
    }

    pub fn chroma_height(&self) -> usize {
        chroma_dims(self.width, self.height).1
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn y(&self) -> &[u8] {
        &self.data[..self.width * self.height]
    }

    pub fn u(&self) -> &[u8] {
        let start = self.width * self.height;
        &self.data[start..start + self.chroma_width() * self.chroma_height()]
    }

    pub fn v(&self) -> &[u8] {
        let start = self.width * self.height + self.chroma_width() * self.chroma_height();
        &self.data[start..start + self.chroma_width() * self.chroma_height()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Build a strided plane where sample (r, c) = f(r, c) and every other
    /// byte is `pad`.
    fn strided_plane(
        w: usize,
        h: usize,
        row_stride: usize,
        pixel_stride: usize,
        pad: u8,
        f: impl Fn(usize, usize) -> u8,
    ) -> Vec<u8> {
        let mut buf = vec![pad; row_stride * h];
        for r in 0..h {
            for c in 0..w {
                buf[r * row_stride + c * pixel_stride] = f(r, c);
            }
        }
        buf
    }

    #[test]
    fn test_chroma_dims_round_up() {
        assert_eq!(chroma_dims(5, 3), (3, 2));
        assert_eq!(chroma_dims(4, 4), (2, 2));
        assert_eq!(chroma_dims(1, 1), (1, 1));
    }

    #[test]
    fn test_odd_dims_sizes() {
        let y = vec![10u8; 5 * 3];
        let u = vec![20u8; 3 * 2];
        let v = vec![30u8; 3 * 2];
        let packed = PackedYuv420::from_planes(
            5,
            3,
            &PlaneDescriptor::new(&y, 5, 1),
            &PlaneDescriptor::new(&u, 3, 1),
            &PlaneDescriptor::new(&v, 3, 1),
            PlaneOrder::Yuv,
        )
        .unwrap();
        assert_eq!(packed.y().len(), 15);
        assert_eq!(packed.u().len(), 3 * 2);
        assert_eq!(packed.v().len(), 3 * 2);
        assert_eq!(packed.as_bytes().len(), 15 + 12);
        assert!(packed.u().iter().all(|&b| b == 20));
        assert!(packed.v().iter().all(|&b| b == 30));
    }

    #[test]
    fn test_row_padding_never_leaks() {
        let (w, h) = (6, 4);
        let (cw, ch) = chroma_dims(w, h);
        for pixel_stride in [1usize, 2] {
            let y_rs = w * pixel_stride + 7;
            let c_rs = cw * pixel_stride + 3;
            let y = strided_plane(w, h, y_rs, pixel_stride, 0xEE, |r, c| (r * 16 + c) as u8);
            let u = strided_plane(cw, ch, c_rs, pixel_stride, 0xEE, |r, c| (100 + r * 8 + c) as u8);
            let v = strided_plane(cw, ch, c_rs, pixel_stride, 0xEE, |r, c| (200 + r * 8 + c) as u8);

            let packed = PackedYuv420::from_planes(
                w,
                h,
                &PlaneDescriptor::new(&y, y_rs as i32, pixel_stride as i32),
                &PlaneDescriptor::new(&u, c_rs as i32, pixel_stride as i32),
                &PlaneDescriptor::new(&v, c_rs as i32, pixel_stride as i32),
                PlaneOrder::Yuv,
            )
            .unwrap();

            for r in 0..h {
                for c in 0..w {
                    assert_eq!(packed.y()[r * w + c], y[r * y_rs + c * pixel_stride]);
                }
            }
            for r in 0..ch {
                for c in 0..cw {
                    assert_eq!(packed.u()[r * cw + c], u[r * c_rs + c * pixel_stride]);
                    assert_eq!(packed.v()[r * cw + c], v[r * c_rs + c * pixel_stride]);
                }
            }
            assert!(!packed.as_bytes().contains(&0xEE));
        }
    }

    #[test]
    fn test_mixed_chroma_pixel_strides() {
        let y = vec![0u8; 4 * 2];
        let u = vec![7u8; 2];
        // Interleaved V: samples at 0 and 2.
        let v = [9u8, 0xEE, 9];
        let packed = PackedYuv420::from_planes(
            4,
            2,
            &PlaneDescriptor::new(&y, 4, 1),
            &PlaneDescriptor::new(&u, 2, 1),
            &PlaneDescriptor::new(&v, 4, 2),
            PlaneOrder::Yuv,
        )
        .unwrap();
        assert_eq!(packed.u(), &[7, 7]);
        assert_eq!(packed.v(), &[9, 9]);
    }

    #[test]
    fn test_plane_order_swaps_chroma() {
        let y = vec![0u8; 4];
        let c1 = [1u8];
        let c2 = [2u8];
        let packed = PackedYuv420::from_planes(
            2,
            2,
            &PlaneDescriptor::new(&y, 2, 1),
            &PlaneDescriptor::new(&c1, 1, 1),
            &PlaneDescriptor::new(&c2, 1, 1),
            PlaneOrder::Yvu,
        )
        .unwrap();
        assert_eq!(packed.u(), &[2]);
        assert_eq!(packed.v(), &[1]);
    }

    #[test]
    fn test_null_chroma_plane_fails() {
        let y = vec![0u8; 4];
        let u = [0u8];
        let err = PackedYuv420::from_planes(
            2,
            2,
            &PlaneDescriptor::new(&y, 2, 1),
            &PlaneDescriptor::new(&u, 1, 1),
            &PlaneDescriptor::null(1, 1),
            PlaneOrder::Yuv,
        )
        .unwrap_err();
        assert!(matches!(err, FrameError::Precondition(_)));
    }

    #[test]
    fn test_zero_dims_fail() {
        let y = [0u8; 1];
        let d = PlaneDescriptor::new(&y, 1, 1);
        assert!(PackedYuv420::from_planes(0, 1, &d, &d, &d, PlaneOrder::Yuv).is_err());
        assert!(PackedYuv420::from_planes(1, 0, &d, &d, &d, PlaneOrder::Yuv).is_err());
    }
}
