//! Android surface: writes RGBA frames into an ANativeWindow.
//!
//! The Java side passes an `android.view.Surface`; this module takes a
//! reference to its `ANativeWindow`, sizes the buffer queue to the frame,
//! locks one buffer, hands it to the blit and posts it when the lock guard
//! drops.

use std::ptr::NonNull;

use camblit_core::{FrameError, Surface, SurfaceBuffer, SurfaceLock};

// AHARDWAREBUFFER_FORMAT_R8G8B8A8_UNORM / WINDOW_FORMAT_RGBA_8888
const WINDOW_FORMAT_RGBA_8888: i32 = 1;
// WINDOW_FORMAT_RGBX_8888, same 4-byte layout.
const WINDOW_FORMAT_RGBX_8888: i32 = 2;

/// Owns one reference to an `ANativeWindow`, released on drop.
pub struct NativeWindowSurface {
    window: NonNull<ndk_sys::ANativeWindow>,
}

// SAFETY: ANativeWindow is internally reference counted and thread-safe;
// the surface is only used by the thread currently processing a frame.
unsafe impl Send for NativeWindowSurface {}

impl NativeWindowSurface {
    /// Acquire the window behind a Java `Surface`.
    ///
    /// # Safety
    /// `env` must be a valid JNI environment for the current thread and
    /// `surface` a valid local or global reference to `android.view.Surface`.
    pub unsafe fn from_surface(
        env: *mut jni::sys::JNIEnv,
        surface: jni::sys::jobject,
    ) -> Result<Self, FrameError> {
        let window = unsafe { ndk_sys::ANativeWindow_fromSurface(env as *mut _, surface as *mut _) };
        NonNull::new(window)
            .map(|window| Self { window })
            .ok_or_else(|| FrameError::Surface("ANativeWindow_fromSurface returned null".into()))
    }

    pub fn as_ptr(&self) -> *mut ndk_sys::ANativeWindow {
        self.window.as_ptr()
    }
}

impl Drop for NativeWindowSurface {
    fn drop(&mut self) {
        unsafe { ndk_sys::ANativeWindow_release(self.window.as_ptr()) };
    }
}

impl Surface for NativeWindowSurface {
    type Lock<'a>
        = NativeWindowLock<'a>
    where
        Self: 'a;

    fn set_geometry(&mut self, width: usize, height: usize) -> Result<(), FrameError> {
        let (Ok(w), Ok(h)) = (i32::try_from(width), i32::try_from(height)) else {
            return Err(FrameError::Surface(format!(
                "geometry out of range: {width} x {height}"
            )));
        };
        let result = unsafe {
            ndk_sys::ANativeWindow_setBuffersGeometry(
                self.window.as_ptr(),
                w,
                h,
                WINDOW_FORMAT_RGBA_8888,
            )
        };
        if result != 0 {
            return Err(FrameError::Surface(format!(
                "ANativeWindow_setBuffersGeometry failed: {result}"
            )));
        }
        Ok(())
    }

    fn lock(&mut self) -> Result<NativeWindowLock<'_>, FrameError> {
        let mut native_buf = std::mem::MaybeUninit::<ndk_sys::ANativeWindow_Buffer>::uninit();
        let result = unsafe {
            ndk_sys::ANativeWindow_lock(
                self.window.as_ptr(),
                native_buf.as_mut_ptr(),
                std::ptr::null_mut(), // no dirty rect, redraw everything
            )
        };
        if result != 0 {
            return Err(FrameError::Surface(format!(
                "ANativeWindow_lock failed: {result}"
            )));
        }

        // From here on the guard owns the lock and posts it on every path.
        let lock = NativeWindowLock {
            window: self.window,
            buffer: unsafe { native_buf.assume_init() },
            _surface: std::marker::PhantomData,
        };

        let b = &lock.buffer;
        if b.format != WINDOW_FORMAT_RGBA_8888 && b.format != WINDOW_FORMAT_RGBX_8888 {
            return Err(FrameError::Surface(format!(
                "unsupported window format: {}",
                b.format
            )));
        }
        if b.bits.is_null() || b.width <= 0 || b.height <= 0 || b.stride < b.width {
            return Err(FrameError::Surface(format!(
                "invalid window buffer: {}x{} stride {}",
                b.width, b.height, b.stride
            )));
        }
        Ok(lock)
    }
}

/// A locked window buffer. Dropping it calls `ANativeWindow_unlockAndPost`.
pub struct NativeWindowLock<'a> {
    window: NonNull<ndk_sys::ANativeWindow>,
    buffer: ndk_sys::ANativeWindow_Buffer,
    _surface: std::marker::PhantomData<&'a mut NativeWindowSurface>,
}

impl SurfaceLock for NativeWindowLock<'_> {
    fn buffer(&mut self) -> SurfaceBuffer<'_> {
        let width = self.buffer.width as usize;
        let height = self.buffer.height as usize;
        let stride = self.buffer.stride as usize; // in pixels (RGBA = 4 bytes each)
        // SAFETY: the window is locked, so `bits` points at `stride * height`
        // 4-byte pixels that nobody else touches until unlockAndPost.
        let pixels = unsafe {
            std::slice::from_raw_parts_mut(self.buffer.bits as *mut u8, stride * height * 4)
        };
        SurfaceBuffer {
            pixels,
            width,
            height,
            stride,
        }
    }
}

impl Drop for NativeWindowLock<'_> {
    fn drop(&mut self) {
        let result = unsafe { ndk_sys::ANativeWindow_unlockAndPost(self.window.as_ptr()) };
        if result != 0 {
            tracing::warn!("ANativeWindow_unlockAndPost failed: {result}");
        }
    }
}
