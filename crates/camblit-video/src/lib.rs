//! Platform presentation surfaces for camblit frames.
//!
//! Android: the `ANativeWindow` behind a Java `Surface`, locked for one blit
//! and posted on unlock. Desktop: an in-memory `RgbaImage` with JPEG export
//! for previews and debugging.

#[cfg(target_os = "android")]
mod android;

#[cfg(target_os = "android")]
pub use android::{NativeWindowLock, NativeWindowSurface};

#[cfg(any(target_os = "macos", target_os = "linux", target_os = "windows"))]
mod desktop;

#[cfg(any(target_os = "macos", target_os = "linux", target_os = "windows"))]
pub use desktop::{ImageLock, ImageSurface};
