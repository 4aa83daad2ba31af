//! JNI bridge for the camblit frame pipeline.
//!
//! Exposes the native methods of `com.example.play_opencv.MainActivity`:
//! `processFrame(Image, Surface)` converts one YUV_420_888 camera image and
//! draws it onto the given `Surface`; `nativeInit(String)` loads settings;
//! `stringFromJNI()` returns a greeting.

use std::path::Path;
use std::sync::OnceLock;

use camblit_core::FrameSettings;

#[cfg(target_os = "android")]
mod bindings;
#[cfg(target_os = "android")]
mod errors;
#[cfg(target_os = "android")]
mod jni_entry;

#[cfg(target_os = "android")]
pub use bindings::JniBindings;
#[cfg(target_os = "android")]
pub use errors::BridgeError;

/// Settings shared read-only by every frame call.
static SETTINGS: OnceLock<FrameSettings> = OnceLock::new();

// ── Android logcat helper ────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LogPriority {
    Info = 4,
    Error = 6,
}

/// Write a message to logcat on Android, or stderr on other platforms.
pub(crate) fn camblit_log(prio: LogPriority, msg: &str) {
    #[cfg(target_os = "android")]
    {
        use std::ffi::CString;
        unsafe extern "C" {
            fn __android_log_write(prio: i32, tag: *const std::ffi::c_char, text: *const std::ffi::c_char) -> i32;
        }
        let tag = c"CAMBLIT";
        let text = CString::new(msg).unwrap_or_else(|_| CString::from(c"(invalid utf8)"));
        unsafe { __android_log_write(prio as i32, tag.as_ptr(), text.as_ptr()); }
    }
    #[cfg(not(target_os = "android"))]
    eprintln!("[{prio:?}] {msg}");
}

// ── Namespace functions ──────────────────────────────────────────────

/// Initialize tracing/logging. Safe to call more than once.
pub fn init_logging() {
    use std::sync::Once;
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            tracing_subscriber::EnvFilter::new("camblit_core=debug,camblit_ffi=debug,camblit_video=info")
        });
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .try_init();
    });
}

/// Load `<data_dir>/camblit.json` as the process settings.
///
/// Returns `false` if settings were already fixed by an earlier call or by a
/// frame processed before initialization.
pub fn init(data_dir: impl AsRef<Path>) -> bool {
    init_logging();
    let loaded = FrameSettings::from_dir(data_dir);
    tracing::info!(?loaded, "camblit settings loaded");
    if SETTINGS.set(loaded).is_err() {
        camblit_log(LogPriority::Error, "CAMBLIT: settings already initialized, keeping previous");
        return false;
    }
    camblit_log(LogPriority::Info, "CAMBLIT: settings initialized");
    true
}

/// Current settings, defaults if `init` was never called.
pub fn settings() -> &'static FrameSettings {
    SETTINGS.get_or_init(FrameSettings::default)
}

pub fn greeting() -> String {
    format!(
        "Hello from Rust! Using camblit version: {}",
        env!("CARGO_PKG_VERSION")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use camblit_core::{PlaneOrder, Rotation};

    #[test]
    fn test_greeting_mentions_version() {
        assert!(greeting().contains(env!("CARGO_PKG_VERSION")));
    }

    #[test]
    fn test_init_fixes_settings_once() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(camblit_core::settings::SETTINGS_FILE),
            r#"{"plane_order":"yvu","rotation":270}"#,
        )
        .unwrap();

        assert!(init(dir.path()));
        assert_eq!(settings().plane_order, PlaneOrder::Yvu);
        assert_eq!(settings().rotation, Rotation::Deg270);

        // Second init is ignored.
        let other = tempfile::tempdir().unwrap();
        assert!(!init(other.path()));
        assert_eq!(settings().plane_order, PlaneOrder::Yvu);
    }

    #[test]
    fn test_log_helper_does_not_panic() {
        camblit_log(LogPriority::Info, "hello");
        camblit_log(LogPriority::Error, "bad\0string");
    }
}
