//! camblit core frame pipeline.
//!
//! Pure Rust crate with no platform dependencies. Takes the three strided
//! planes of a YUV_420_888 camera image, normalizes them into a packed I420
//! buffer, converts to RGBA (BT.601), rotates, draws the overlay and blits
//! the result into a locked presentation surface.

pub mod blit;
pub mod color;
pub mod errors;
pub mod i420;
pub mod pipeline;
pub mod plane;
pub mod settings;
pub mod surface;
pub mod transform;

pub use blit::{SurfaceBuffer, blit};
pub use color::{ColorRange, RgbaFrame, yuv420_to_rgba};
pub use errors::FrameError;
pub use i420::PackedYuv420;
pub use pipeline::{convert_and_render, prepare_frame, present, process_frame};
pub use plane::{PlaneDescriptor, PlaneOrder, PlaneView};
pub use settings::FrameSettings;
pub use surface::{MemorySurface, Surface, SurfaceLock};
pub use transform::{OverlayStyle, Rotation};
