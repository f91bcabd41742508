//! Pixel formats supported by the capture path.

use serde::{Deserialize, Serialize};

/// Pixel memory layout of a drawable or pixel buffer.
///
/// Both formats are 8 bits per channel, 4 bytes per pixel; converting between
/// them is a per-pixel red/blue channel swap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PixelFormat {
    /// Blue, green, red, alpha — the usual compositor surface layout.
    #[default]
    Bgra8,
    /// Red, green, blue, alpha — the usual immediate-context readback layout.
    Rgba8,
}

impl PixelFormat {
    /// Bytes occupied by one pixel.
    pub const fn bytes_per_pixel(self) -> usize {
        4
    }

    /// Short identifier used in settings dictionaries and logs.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Bgra8 => "bgra8",
            Self::Rgba8 => "rgba8",
        }
    }
}

impl std::fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
