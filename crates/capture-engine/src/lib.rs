//! Scenecap Capture Engine
//!
//! Turns rendered frames into pooled, timestamped pixel buffers:
//! - **Pool + factory:** bounded reusable frame memory, cached per attribute set
//! - **Producers:** compositor-drawable copy and immediate-context readback
//! - **Session:** [`SceneVideoInput`], driven once per frame by the render loop,
//!   feeding a [`PixelBufferSink`]
//!
//! The engine talks to rendering backends only through the contracts in
//! `scenecap-surface-core`.

pub mod convert;
pub mod factory;
pub mod pool;
pub mod producer;
pub mod session;
pub mod settings;

pub use factory::PixelBufferPoolFactory;
pub use pool::{PixelBuffer, PixelBufferPool};
pub use producer::{
    CompositorPixelBufferProducer, ImmediatePixelBufferProducer, PixelBufferProducer,
};
pub use session::{PixelBufferSink, SceneVideoInput, VideoInputState};
pub use settings::{Codec, VideoSettings};
