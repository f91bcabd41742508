//! Mapping between wgpu texture formats and capture pixel formats.

use scenecap_common::error::{RecorderError, RecorderResult};
use scenecap_surface_core::PixelFormat;

/// Capture pixel format for a surface texture format.
///
/// Only 8-bit BGRA/RGBA surfaces are readable by the capture path; anything
/// else is rejected at layer construction.
pub fn pixel_format_for(format: wgpu::TextureFormat) -> RecorderResult<PixelFormat> {
    match format {
        wgpu::TextureFormat::Bgra8Unorm | wgpu::TextureFormat::Bgra8UnormSrgb => {
            Ok(PixelFormat::Bgra8)
        }
        wgpu::TextureFormat::Rgba8Unorm | wgpu::TextureFormat::Rgba8UnormSrgb => {
            Ok(PixelFormat::Rgba8)
        }
        other => Err(RecorderError::texture(format!(
            "unsupported surface texture format {other:?}"
        ))),
    }
}

/// The non-sRGB wgpu format for a capture pixel format.
pub fn texture_format_for(format: PixelFormat) -> wgpu::TextureFormat {
    match format {
        PixelFormat::Bgra8 => wgpu::TextureFormat::Bgra8Unorm,
        PixelFormat::Rgba8 => wgpu::TextureFormat::Rgba8Unorm,
    }
}

/// Row stride a texture→buffer copy must use: `unpadded` rounded up to the
/// copy alignment wgpu requires (256 bytes).
pub fn padded_bytes_per_row(unpadded: u32) -> u32 {
    let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
    unpadded.div_ceil(align) * align
}
