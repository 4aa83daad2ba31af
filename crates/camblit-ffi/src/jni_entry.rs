//! `extern "C"` JNI entry points.
//!
//! None of these throw into Java: every failure is logged and the frame is
//! dropped.

use std::ffi::c_void;
use std::sync::OnceLock;

use camblit_core::{FrameError, FrameSettings, PlaneDescriptor, prepare_frame, present};
use camblit_video::NativeWindowSurface;
use jni::JNIEnv;
use jni::objects::{JObject, JString};
use jni::sys::{JNI_ERR, JNI_VERSION_1_6, jint, jobject, jstring};

use crate::bindings::JniBindings;
use crate::errors::BridgeError;
use crate::{LogPriority, camblit_log};

static BINDINGS: OnceLock<JniBindings> = OnceLock::new();

/// Local references created per frame: planes array, 3 planes, 3 buffers,
/// plus slack for call results.
const LOCAL_FRAME_CAPACITY: i32 = 16;

/// Called when the library is loaded: cache class and method IDs.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn JNI_OnLoad(vm: *mut jni::sys::JavaVM, _reserved: *mut c_void) -> jint {
    crate::init_logging();

    let vm = match unsafe { jni::JavaVM::from_raw(vm) } {
        Ok(vm) => vm,
        Err(_) => return JNI_ERR,
    };
    let result = match vm.get_env() {
        Ok(mut env) => JniBindings::new(&mut env),
        Err(e) => Err(e.into()),
    };
    // Prevent Drop from calling DestroyJavaVM
    std::mem::forget(vm);

    match result {
        Ok(bindings) => {
            let _ = BINDINGS.set(bindings);
            camblit_log(LogPriority::Info, "CAMBLIT: JNI_OnLoad completed, cached method IDs");
            JNI_VERSION_1_6
        }
        Err(e) => {
            tracing::error!("JNI_OnLoad failed: {e}");
            camblit_log(LogPriority::Error, &format!("CAMBLIT: JNI_OnLoad failed: {e}"));
            JNI_ERR
        }
    }
}

/// JNI: MainActivity.nativeInit(dataDir: String)
#[unsafe(no_mangle)]
pub unsafe extern "C" fn Java_com_example_play_1opencv_MainActivity_nativeInit(
    env: *mut jni::sys::JNIEnv,
    _this: jobject,
    data_dir: jstring,
) {
    let mut jni_env = match unsafe { JNIEnv::from_raw(env) } {
        Ok(e) => e,
        Err(_) => return,
    };
    let jstr = unsafe { JString::from_raw(data_dir) };
    if jstr.is_null() {
        camblit_log(LogPriority::Error, "CAMBLIT: nativeInit: dataDir is null");
        return;
    }
    let dir: String = match jni_env.get_string(&jstr) {
        Ok(s) => s.into(),
        Err(e) => {
            camblit_log(LogPriority::Error, &format!("CAMBLIT: nativeInit: bad dataDir: {e}"));
            return;
        }
    };
    crate::init(&dir);
}

/// JNI: MainActivity.stringFromJNI(): String
#[unsafe(no_mangle)]
pub unsafe extern "C" fn Java_com_example_play_1opencv_MainActivity_stringFromJNI(
    env: *mut jni::sys::JNIEnv,
    _this: jobject,
) -> jstring {
    let Ok(mut jni_env) = (unsafe { JNIEnv::from_raw(env) }) else {
        return std::ptr::null_mut();
    };
    match jni_env.new_string(crate::greeting()) {
        Ok(s) => s.into_raw(),
        Err(_) => std::ptr::null_mut(),
    }
}

/// JNI: MainActivity.processFrame(image: android.media.Image, surface: Surface)
///
/// Converts one YUV_420_888 image to RGBA and presents it on `surface`.
///
/// # Safety
/// - `env` must be a valid JNI environment pointer for the calling thread.
/// - `image` must be an open `android.media.Image`, `surface` an
///   `android.view.Surface`. Both stay owned by the caller.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn Java_com_example_play_1opencv_MainActivity_processFrame(
    env: *mut jni::sys::JNIEnv,
    _this: jobject,
    image: jobject,
    surface: jobject,
) {
    if image.is_null() {
        camblit_log(LogPriority::Error, "CAMBLIT: processFrame: image is null");
        return;
    }
    if surface.is_null() {
        camblit_log(LogPriority::Error, "CAMBLIT: processFrame: surface is null");
        return;
    }
    let Some(bindings) = BINDINGS.get() else {
        camblit_log(LogPriority::Error, "CAMBLIT: processFrame: JNI bindings not initialized");
        return;
    };
    let mut jni_env = match unsafe { JNIEnv::from_raw(env) } {
        Ok(e) => e,
        Err(_) => return,
    };

    let image = unsafe { JObject::from_raw(image) };
    let surface = unsafe { JObject::from_raw(surface) };
    let settings = crate::settings();

    let result = jni_env.with_local_frame(LOCAL_FRAME_CAPACITY, |env| {
        render_image(env, bindings, settings, &image, &surface)
    });

    match result {
        Ok((w, h)) => {
            tracing::info!(width = w, height = h, "processFrame: rendered {w}x{h}");
        }
        Err(e) => {
            tracing::error!(kind = e.kind(), "processFrame: {e}");
            camblit_log(LogPriority::Error, &format!("CAMBLIT: processFrame: {e}"));
        }
    }

    // A failed Java call leaves an exception pending; the frame is dropped
    // instead of surfacing it to the caller.
    if jni_env.exception_check().unwrap_or(false) {
        let _ = jni_env.exception_clear();
    }
}

/// Read the image planes, build the RGBA frame, then lock and blit the
/// window. Returns the presented dimensions.
fn render_image(
    env: &mut JNIEnv,
    bindings: &JniBindings,
    settings: &FrameSettings,
    image: &JObject,
    surface: &JObject,
) -> Result<(usize, usize), BridgeError> {
    let (width, height) = bindings.image_size(env, image)?;
    if width <= 0 || height <= 0 {
        return Err(FrameError::Precondition(format!("invalid image dims: {width} x {height}")).into());
    }

    let planes = bindings.planes(env, image)?;
    let count = env.get_array_length(&planes)?;
    if count < 3 {
        return Err(FrameError::Precondition(format!("unexpected plane count: {count}")).into());
    }

    let mut descriptors: Vec<PlaneDescriptor<'_>> = Vec::with_capacity(3);
    for index in 0..3 {
        // SAFETY: the descriptors are dropped before this call returns, while
        // the Java caller still holds the image open.
        descriptors.push(unsafe { bindings.plane(env, &planes, index) }?);
    }

    let frame = prepare_frame(settings, width, height, &descriptors)?;
    drop(descriptors);

    // SAFETY: env is the live environment of this call; surface is non-null.
    let mut window = unsafe { NativeWindowSurface::from_surface(env.get_raw(), surface.as_raw()) }?;
    present(&frame, &mut window)?;
    Ok((frame.width(), frame.height()))
}
