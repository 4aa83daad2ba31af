//! Cached JNI class and method identifiers for `android.media.Image`.
//!
//! Built once in `JNI_OnLoad` and passed by reference into every frame
//! call; nothing here is mutated afterwards.

use camblit_core::{FrameError, PlaneDescriptor};
use jni::JNIEnv;
use jni::objects::{GlobalRef, JByteBuffer, JMethodID, JObject, JObjectArray};
use jni::signature::{Primitive, ReturnType};

use crate::errors::BridgeError;

pub struct JniBindings {
    // Global refs keep the classes (and so the method IDs) alive.
    _image_class: GlobalRef,
    get_planes: JMethodID,
    get_width: JMethodID,
    get_height: JMethodID,

    _plane_class: GlobalRef,
    get_buffer: JMethodID,
    get_pixel_stride: JMethodID,
    get_row_stride: JMethodID,
}

impl JniBindings {
    pub fn new(env: &mut JNIEnv) -> Result<Self, BridgeError> {
        let image_class = env.find_class("android/media/Image")?;
        let get_planes =
            env.get_method_id(&image_class, "getPlanes", "()[Landroid/media/Image$Plane;")?;
        let get_width = env.get_method_id(&image_class, "getWidth", "()I")?;
        let get_height = env.get_method_id(&image_class, "getHeight", "()I")?;

        let plane_class = env.find_class("android/media/Image$Plane")?;
        let get_buffer = env.get_method_id(&plane_class, "getBuffer", "()Ljava/nio/ByteBuffer;")?;
        let get_pixel_stride = env.get_method_id(&plane_class, "getPixelStride", "()I")?;
        let get_row_stride = env.get_method_id(&plane_class, "getRowStride", "()I")?;

        Ok(Self {
            _image_class: env.new_global_ref(&image_class)?,
            get_planes,
            get_width,
            get_height,
            _plane_class: env.new_global_ref(&plane_class)?,
            get_buffer,
            get_pixel_stride,
            get_row_stride,
        })
    }

    fn call_int(&self, env: &mut JNIEnv, obj: &JObject, method: JMethodID) -> Result<i32, BridgeError> {
        // SAFETY: every cached ID refers to a `()I` method of obj's class.
        let value = unsafe {
            env.call_method_unchecked(obj, method, ReturnType::Primitive(Primitive::Int), &[])
        }?;
        Ok(value.i()?)
    }

    /// `Image.getWidth()` / `Image.getHeight()`.
    pub fn image_size(&self, env: &mut JNIEnv, image: &JObject) -> Result<(i32, i32), BridgeError> {
        let width = self.call_int(env, image, self.get_width)?;
        let height = self.call_int(env, image, self.get_height)?;
        Ok((width, height))
    }

    /// `Image.getPlanes()`; a null array is a precondition failure.
    pub fn planes<'local>(
        &self,
        env: &mut JNIEnv<'local>,
        image: &JObject,
    ) -> Result<JObjectArray<'local>, BridgeError> {
        let planes = unsafe { env.call_method_unchecked(image, self.get_planes, ReturnType::Array, &[]) }?
            .l()?;
        if planes.is_null() {
            return Err(FrameError::Precondition("Image.getPlanes() returned null".into()).into());
        }
        Ok(JObjectArray::from(planes))
    }

    /// Describe plane `index`: its direct buffer and strides.
    ///
    /// A null or non-direct buffer yields `data: None`.
    ///
    /// # Safety
    /// The returned slice aliases the Java direct buffer. `'buf` must not
    /// outlive the current native call, and the image must stay open for it.
    pub unsafe fn plane<'buf>(
        &self,
        env: &mut JNIEnv,
        planes: &JObjectArray,
        index: i32,
    ) -> Result<PlaneDescriptor<'buf>, BridgeError> {
        let plane = env.get_object_array_element(planes, index)?;
        let row_stride = self.call_int(env, &plane, self.get_row_stride)?;
        let pixel_stride = self.call_int(env, &plane, self.get_pixel_stride)?;

        let buffer = unsafe { env.call_method_unchecked(&plane, self.get_buffer, ReturnType::Object, &[]) }?
            .l()?;
        if buffer.is_null() {
            return Ok(PlaneDescriptor::null(row_stride, pixel_stride));
        }
        let buffer = JByteBuffer::from(buffer);
        let addr = match env.get_direct_buffer_address(&buffer) {
            Ok(addr) if !addr.is_null() => addr,
            _ => {
                tracing::debug!(index, "plane buffer has no direct address");
                return Ok(PlaneDescriptor::null(row_stride, pixel_stride));
            }
        };
        let capacity = env.get_direct_buffer_capacity(&buffer)?;
        // SAFETY: addr/capacity describe a live direct buffer (see above).
        let data = unsafe { std::slice::from_raw_parts(addr as *const u8, capacity) };
        Ok(PlaneDescriptor::new(data, row_stride, pixel_stride))
    }
}
