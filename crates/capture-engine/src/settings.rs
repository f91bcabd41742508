//! Video settings surfaced to the downstream writer.

use serde::{Deserialize, Serialize};

/// Video codec selection for the output file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Codec {
    Hevc,
    #[default]
    H264,
    Jpeg,
}

impl Codec {
    /// Encoder identifier understood by the writer backend.
    pub const fn encoder_id(self) -> &'static str {
        match self {
            Self::Hevc => "hvc1",
            Self::H264 => "avc1",
            Self::Jpeg => "jpeg",
        }
    }

    /// Parse a codec from its configuration name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "hevc" => Some(Self::Hevc),
            "h264" => Some(Self::H264),
            "jpeg" => Some(Self::Jpeg),
            _ => None,
        }
    }
}

/// Codec and geometry recommended to the writer for one recording session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoSettings {
    pub codec: Codec,
    pub width: u32,
    pub height: u32,
}

impl VideoSettings {
    /// Settings for the given output geometry with the default codec.
    pub fn recommended(width: u32, height: u32) -> Self {
        Self {
            codec: Codec::default(),
            width,
            height,
        }
    }

    /// The settings dictionary handed to the writer.
    pub fn to_output_settings(&self) -> serde_json::Value {
        serde_json::json!({
            "codec": self.codec.encoder_id(),
            "width": self.width,
            "height": self.height,
        })
    }
}
