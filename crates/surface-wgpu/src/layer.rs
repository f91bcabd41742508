//! wgpu-backed recordable layer.

use std::any::Any;
use std::sync::{Arc, Mutex};

use scenecap_common::error::RecorderResult;
use scenecap_surface_core::{
    Drawable, PixelFormat, RecordableLayer, RecordingLayer, RenderingApi, SceneRecordableView,
};

use crate::drawable::WgpuDrawable;
use crate::format::pixel_format_for;

/// A presentable wgpu surface exposed as a recordable compositing layer.
///
/// The framebuffer-only attribute maps onto the surface usage set: a
/// display-only surface carries `RENDER_ATTACHMENT` alone, a recordable one
/// adds `COPY_SRC`. Toggling the attribute reconfigures the surface, which
/// takes effect at the next acquisition.
pub struct WgpuRecordableLayer {
    device: wgpu::Device,
    queue: wgpu::Queue,
    surface: wgpu::Surface<'static>,
    format: PixelFormat,
    config: Mutex<wgpu::SurfaceConfiguration>,
}

impl WgpuRecordableLayer {
    /// Wrap a configured surface. Fails if the surface format has no capture
    /// pixel format.
    pub fn new(
        device: wgpu::Device,
        queue: wgpu::Queue,
        surface: wgpu::Surface<'static>,
        config: wgpu::SurfaceConfiguration,
    ) -> RecorderResult<Arc<Self>> {
        let format = pixel_format_for(config.format)?;
        surface.configure(&device, &config);
        Ok(Arc::new(Self {
            device,
            queue,
            surface,
            format,
            config: Mutex::new(config),
        }))
    }

    /// Track a window resize: reconfigure the surface to the new extent.
    pub fn resize(&self, width: u32, height: u32) {
        let mut config = self.config.lock().unwrap_or_else(|e| e.into_inner());
        if (config.width, config.height) == (width, height) {
            return;
        }
        config.width = width;
        config.height = height;
        self.surface.configure(&self.device, &config);
        tracing::debug!(width, height, "surface resized");
    }
}

impl RecordableLayer for WgpuRecordableLayer {
    fn drawable_size(&self) -> (u32, u32) {
        let config = self.config.lock().unwrap_or_else(|e| e.into_inner());
        (config.width, config.height)
    }

    fn pixel_format(&self) -> PixelFormat {
        self.format
    }

    fn framebuffer_only(&self) -> bool {
        let config = self.config.lock().unwrap_or_else(|e| e.into_inner());
        !config.usage.contains(wgpu::TextureUsages::COPY_SRC)
    }

    fn set_framebuffer_only(&self, framebuffer_only: bool) {
        let usage = if framebuffer_only {
            wgpu::TextureUsages::RENDER_ATTACHMENT
        } else {
            wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC
        };
        let mut config = self.config.lock().unwrap_or_else(|e| e.into_inner());
        if config.usage == usage {
            return;
        }
        config.usage = usage;
        self.surface.configure(&self.device, &config);
        tracing::debug!(framebuffer_only, "surface usage reconfigured");
    }

    fn next_drawable(&self) -> Option<Arc<dyn Drawable>> {
        match self.surface.get_current_texture() {
            Ok(surface_texture) => Some(Arc::new(WgpuDrawable::new(
                self.device.clone(),
                self.queue.clone(),
                surface_texture,
                self.format,
            ))),
            Err(err) => {
                tracing::warn!(error = %err, "failed to acquire surface texture");
                None
            }
        }
    }

    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

/// A wgpu-presented scene view, ready to back a recording session.
pub struct WgpuSceneView {
    layer: Arc<RecordingLayer>,
}

impl WgpuSceneView {
    /// Decorate `layer` for interception and expose it as a recordable view.
    ///
    /// The render loop must acquire drawables through [`Self::layer`] for
    /// captures to see them.
    pub fn new(layer: Arc<WgpuRecordableLayer>) -> Self {
        Self {
            layer: RecordingLayer::install(layer),
        }
    }

    /// The interception decorator the render loop should acquire through.
    pub fn layer(&self) -> Arc<RecordingLayer> {
        self.layer.clone()
    }
}

impl SceneRecordableView for WgpuSceneView {
    fn rendering_api(&self) -> RenderingApi {
        RenderingApi::Gpu
    }

    fn recording_layer(&self) -> Option<Arc<RecordingLayer>> {
        Some(self.layer.clone())
    }
}
