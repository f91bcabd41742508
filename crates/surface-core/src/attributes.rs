//! Pixel buffer attributes negotiated between producers and pools.

use serde::{Deserialize, Serialize};

use scenecap_common::error::{RecorderError, RecorderResult};

use crate::format::PixelFormat;

/// The attribute set a pixel buffer pool is keyed by.
///
/// Two attribute values that compare equal describe interchangeable buffers;
/// a pool serves exactly one attribute value for its whole lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelBufferAttributes {
    /// Frame width in pixels. Must be non-zero.
    pub width: u32,

    /// Frame height in pixels. Must be non-zero.
    pub height: u32,

    /// Pixel memory layout.
    pub format: PixelFormat,

    /// Row alignment for allocated pixel memory, in bytes.
    pub bytes_per_row_alignment: u32,

    /// Upper bound on buffers the pool may hold at once.
    pub max_buffers: u32,
}

impl PixelBufferAttributes {
    /// Attributes for the given dimensions and format, with default
    /// allocation hints.
    pub fn new(width: u32, height: u32, format: PixelFormat) -> Self {
        Self {
            width,
            height,
            format,
            bytes_per_row_alignment: 64,
            max_buffers: 6,
        }
    }

    /// Check the dimension invariant.
    pub fn validate(&self) -> RecorderResult<()> {
        if self.width == 0 {
            return Err(RecorderError::ZeroWidth);
        }
        if self.height == 0 {
            return Err(RecorderError::ZeroHeight);
        }
        Ok(())
    }

    /// Bytes per row for buffers with these attributes, including alignment
    /// padding. The stride is always a whole number of pixels wide so row
    /// memory can be treated as packed 4-byte units.
    pub fn bytes_per_row(&self) -> usize {
        let unpadded = self.width as usize * self.format.bytes_per_pixel();
        let align = self.bytes_per_row_alignment.max(1) as usize;
        (unpadded.div_ceil(align) * align).next_multiple_of(self.format.bytes_per_pixel())
    }

    /// The attribute dictionary surfaced to downstream writers.
    pub fn to_dictionary(&self) -> serde_json::Value {
        serde_json::json!({
            "width": self.width,
            "height": self.height,
            "pixel_format": self.format.name(),
        })
    }
}
