//! Acquired surface textures and synchronous readback.

use std::sync::Mutex;

use scenecap_common::error::{RecorderError, RecorderResult};
use scenecap_surface_core::{Drawable, PixelFormat};

use crate::format::padded_bytes_per_row;

/// One acquired frame of a wgpu surface.
///
/// Holds the swapchain texture handle alongside the presentable, so the
/// capture path can still read the frame after `present()` hands the
/// presentable back to the compositor. The handle stays valid until the
/// layer's next acquisition, which bounds how long a capture may run.
pub struct WgpuDrawable {
    device: wgpu::Device,
    queue: wgpu::Queue,
    texture: wgpu::Texture,
    surface_texture: Mutex<Option<wgpu::SurfaceTexture>>,
    format: PixelFormat,
}

impl WgpuDrawable {
    pub(crate) fn new(
        device: wgpu::Device,
        queue: wgpu::Queue,
        surface_texture: wgpu::SurfaceTexture,
        format: PixelFormat,
    ) -> Self {
        let texture = surface_texture.texture.clone();
        Self {
            device,
            queue,
            texture,
            surface_texture: Mutex::new(Some(surface_texture)),
            format,
        }
    }

    /// Wrap a bare texture (an offscreen render target) as a drawable.
    pub fn from_texture(
        device: wgpu::Device,
        queue: wgpu::Queue,
        texture: wgpu::Texture,
        format: PixelFormat,
    ) -> Self {
        Self {
            device,
            queue,
            texture,
            surface_texture: Mutex::new(None),
            format,
        }
    }
}

impl Drawable for WgpuDrawable {
    fn size(&self) -> (u32, u32) {
        (self.texture.width(), self.texture.height())
    }

    fn pixel_format(&self) -> PixelFormat {
        self.format
    }

    fn copy_into(&self, dest: &mut [u8], dest_bytes_per_row: usize) -> RecorderResult<()> {
        if !self.texture.usage().contains(wgpu::TextureUsages::COPY_SRC) {
            return Err(RecorderError::texture(
                "drawable is framebuffer-only; its texture cannot be read back",
            ));
        }
        read_texture_into(
            &self.device,
            &self.queue,
            &self.texture,
            dest,
            dest_bytes_per_row,
        )
    }

    fn present(&self) {
        let presentable = self
            .surface_texture
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();
        if let Some(surface_texture) = presentable {
            surface_texture.present();
        }
    }
}

/// Copy `texture` into `dest` rows top-down at `dest_bytes_per_row` stride.
///
/// Blocks until the GPU transfer and buffer mapping complete, so the caller
/// owns a finished frame when this returns.
fn read_texture_into(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    texture: &wgpu::Texture,
    dest: &mut [u8],
    dest_bytes_per_row: usize,
) -> RecorderResult<()> {
    let width = texture.width();
    let height = texture.height();
    let unpadded = width as usize * 4;

    if dest_bytes_per_row < unpadded || dest.len() < height as usize * dest_bytes_per_row {
        return Err(RecorderError::texture(format!(
            "destination too small for {width}x{height} readback"
        )));
    }

    let padded = padded_bytes_per_row(unpadded as u32) as usize;
    let staging = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("scenecap readback staging"),
        size: (padded * height as usize) as u64,
        usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
        mapped_at_creation: false,
    });

    let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
        label: Some("scenecap readback"),
    });
    encoder.copy_texture_to_buffer(
        wgpu::TexelCopyTextureInfo {
            texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        wgpu::TexelCopyBufferInfo {
            buffer: &staging,
            layout: wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(padded as u32),
                rows_per_image: Some(height),
            },
        },
        wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
    );
    queue.submit(Some(encoder.finish()));

    let slice = staging.slice(..);
    let (tx, rx) = std::sync::mpsc::channel();
    slice.map_async(wgpu::MapMode::Read, move |result| {
        let _ = tx.send(result);
    });
    device
        .poll(wgpu::PollType::Wait)
        .map_err(|e| RecorderError::texture(format!("device poll failed: {e}")))?;
    match rx.recv() {
        Ok(Ok(())) => {}
        Ok(Err(e)) => {
            return Err(RecorderError::texture(format!(
                "mapping readback buffer failed: {e}"
            )))
        }
        Err(_) => {
            return Err(RecorderError::texture(
                "readback mapping callback never completed",
            ))
        }
    }

    let data = slice.get_mapped_range();
    for row in 0..height as usize {
        dest[row * dest_bytes_per_row..][..unpadded]
            .copy_from_slice(&data[row * padded..][..unpadded]);
    }
    drop(data);
    staging.unmap();
    Ok(())
}
