//! Pixel buffer producers.
//!
//! A producer turns one rendered frame into a filled pixel buffer. Two
//! variants exist, selected at session construction from the view's
//! rendering API:
//! - [`CompositorPixelBufferProducer`]: copies the drawable intercepted
//!   during the frame's presentation
//! - [`ImmediatePixelBufferProducer`]: reads the immediate-mode context's
//!   framebuffer directly

use scenecap_common::error::RecorderResult;
use scenecap_surface_core::PixelBufferAttributes;

use crate::pool::PixelBuffer;
use crate::settings::VideoSettings;

mod compositor;
mod immediate;

pub use compositor::CompositorPixelBufferProducer;
pub use immediate::ImmediatePixelBufferProducer;

/// Turns rendered frames into filled pixel buffers.
pub trait PixelBufferProducer: Send + Sync {
    /// Attributes matching the source's *current* geometry and format.
    ///
    /// Called every frame; a mid-recording resize shows up here and makes the
    /// pool factory rebuild.
    fn recommended_pixel_buffer_attributes(&self) -> PixelBufferAttributes;

    /// Writer settings derived from the source's current geometry.
    fn recommended_video_settings(&self) -> VideoSettings;

    /// Whether the producer is between `start_writing` and `stop_writing`.
    fn is_writing(&self) -> bool;

    /// Prepare the source for capture. Idempotent.
    fn start_writing(&self);

    /// Release the source back to normal presentation. Idempotent.
    fn stop_writing(&self);

    /// Fill `buffer` with the current frame.
    ///
    /// Completes synchronously within the frame callback; on return the
    /// buffer holds the frame in its own pixel format.
    fn write_in(&self, buffer: &mut PixelBuffer) -> RecorderResult<()>;
}
