//! Scenecap surface contracts.
//!
//! This crate contains the capture-facing view of a rendering surface,
//! decoupled from any concrete graphics backend:
//! - [`RecordableLayer`] / [`Drawable`]: GPU compositor presentation
//! - [`ImmediateContext`]: immediate-mode framebuffer readback
//! - [`RecordingLayer`]: the interception decorator that keeps presented
//!   frames retrievable while recording
//! - [`PixelBufferAttributes`] / [`PixelFormat`]: the negotiated buffer shape

pub mod attributes;
pub mod format;
pub mod layer;
pub mod recording;

pub use attributes::PixelBufferAttributes;
pub use format::PixelFormat;
pub use layer::{Drawable, ImmediateContext, RecordableLayer, RenderingApi, SceneRecordableView};
pub use recording::RecordingLayer;
