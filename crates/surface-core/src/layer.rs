//! Contracts between views, compositing layers, and the capture engine.
//!
//! The capture engine never talks to a concrete graphics backend directly; it
//! sees a presentable layer through [`RecordableLayer`], one presented frame
//! through [`Drawable`], and an immediate-mode context through
//! [`ImmediateContext`]. Backends (see `scenecap-surface-wgpu`) implement
//! these traits; tests implement them with plain in-memory fakes.

use std::any::Any;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use scenecap_common::error::RecorderResult;

use crate::format::PixelFormat;
use crate::recording::RecordingLayer;

/// Rendering API a view declares for itself, used to select the pixel buffer
/// producer variant at session construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RenderingApi {
    /// GPU compositor presentation: frames pass through a presentable
    /// drawable that can be intercepted and read back.
    Gpu,
    /// Immediate-mode context: no separate drawable; frames are read straight
    /// out of the context's framebuffer.
    Immediate,
    #[default]
    Unknown,
}

/// One presented frame's texture, owned by the compositing layer.
///
/// A drawable stays valid for readback until the layer's next acquisition;
/// holders must finish extraction within the frame that produced it.
pub trait Drawable: Send + Sync {
    /// Texture dimensions in pixels.
    fn size(&self) -> (u32, u32);

    /// Texture pixel layout.
    fn pixel_format(&self) -> PixelFormat;

    /// Copy the texture contents into `dest`, rows top-down, each row placed
    /// at a `dest_bytes_per_row` stride and tightly packed within the row.
    ///
    /// The copy is synchronous: when this returns the destination holds the
    /// frame and the GPU is done with the transfer.
    fn copy_into(&self, dest: &mut [u8], dest_bytes_per_row: usize) -> RecorderResult<()>;

    /// Schedule this drawable for presentation. A no-op if already presented.
    fn present(&self);
}

/// A compositing layer whose presented frames can be recorded.
///
/// `set_framebuffer_only(true)` marks the layer's surfaces as
/// write-only-for-display, which is incompatible with capture; the
/// interception decorator suspends that transition while recording.
pub trait RecordableLayer: Send + Sync + 'static {
    /// Current drawable dimensions in pixels. Reflects live resizes.
    fn drawable_size(&self) -> (u32, u32);

    /// Pixel layout of the layer's drawables.
    fn pixel_format(&self) -> PixelFormat;

    /// Whether the layer's surfaces are currently display-only.
    fn framebuffer_only(&self) -> bool;

    /// Apply the display-only attribute to the layer's surfaces.
    fn set_framebuffer_only(&self, framebuffer_only: bool);

    /// Acquire the next presentable drawable, or `None` if the swapchain has
    /// nothing available this frame.
    fn next_drawable(&self) -> Option<Arc<dyn Drawable>>;

    /// Type-erased self, so [`RecordingLayer::install`] can detect an
    /// already-installed decorator.
    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
}

/// An immediate-mode rendering context that can read its framebuffer back
/// into caller-provided memory.
pub trait ImmediateContext: Send + Sync {
    /// Current framebuffer dimensions in pixels.
    fn size(&self) -> (u32, u32);

    /// Pixel layout of the readback data.
    fn pixel_format(&self) -> PixelFormat;

    /// Read the current framebuffer into `dest` at a `dest_bytes_per_row`
    /// stride. Rows are delivered bottom-up, following readback convention;
    /// callers wanting top-down frames flip afterwards.
    fn read_pixels(&self, dest: &mut [u8], dest_bytes_per_row: usize) -> RecorderResult<()>;
}

/// A view whose rendered scene can feed a recording session.
pub trait SceneRecordableView {
    /// The rendering API backing this view.
    fn rendering_api(&self) -> RenderingApi;

    /// The interception decorator over this view's compositing layer, when
    /// the view is GPU-presented.
    fn recording_layer(&self) -> Option<Arc<RecordingLayer>> {
        None
    }

    /// The view's immediate-mode context, when it has one.
    fn immediate_context(&self) -> Option<Arc<dyn ImmediateContext>> {
        None
    }
}
