//! Scenecap wgpu surface backend.
//!
//! Implements the `scenecap-surface-core` contracts over a wgpu device and
//! presentable surface:
//! - [`WgpuRecordableLayer`]: surface ownership, framebuffer-only ⇄ usage
//!   mapping, drawable acquisition
//! - [`WgpuDrawable`]: synchronous texture→memory readback with copy-aligned
//!   row padding
//! - [`WgpuSceneView`]: the view glue a recording session consumes
//!
//! Adapter and device acquisition helpers live here too, so environments
//! without a usable GPU fail loudly at construction instead of mid-session.

pub mod drawable;
pub mod format;
pub mod layer;

pub use drawable::WgpuDrawable;
pub use format::{padded_bytes_per_row, pixel_format_for, texture_format_for};
pub use layer::{WgpuRecordableLayer, WgpuSceneView};

use scenecap_common::error::{RecorderError, RecorderResult};

/// Request the default high-performance adapter.
///
/// Fails with an environment error when no compatible GPU presentation
/// subsystem exists (headless hosts, software-only drivers).
pub fn default_adapter() -> RecorderResult<wgpu::Adapter> {
    let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
    pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
        power_preference: wgpu::PowerPreference::HighPerformance,
        compatible_surface: None,
        force_fallback_adapter: false,
    }))
    .map_err(|e| {
        RecorderError::unsupported_environment(format!("no compatible GPU adapter: {e}"))
    })
}

/// Request a device and queue from `adapter` with default limits.
pub fn request_device(adapter: &wgpu::Adapter) -> RecorderResult<(wgpu::Device, wgpu::Queue)> {
    pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
        label: Some("scenecap device"),
        required_features: wgpu::Features::empty(),
        required_limits: wgpu::Limits::default(),
        memory_hints: wgpu::MemoryHints::Performance,
        trace: wgpu::Trace::Off,
    }))
    .map_err(|e| RecorderError::unsupported_environment(format!("device request failed: {e}")))
}
