//! Media time-base utilities.
//!
//! Downstream writers consume timestamps as integer ticks against a declared
//! time scale (ticks per second). This module provides:
//! - The `MediaTime` value type and seconds conversion
//! - A session clock anchoring a recording epoch for logging

use std::time::Instant;

/// Default time scale used by recording sessions (600 ticks per second).
pub const DEFAULT_TIME_SCALE: i32 = 600;

/// A timestamp expressed as integer ticks against a time scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MediaTime {
    /// Tick count.
    pub value: i64,

    /// Ticks per second.
    pub timescale: i32,
}

impl MediaTime {
    /// Create a media time from raw parts.
    pub const fn new(value: i64, timescale: i32) -> Self {
        Self { value, timescale }
    }

    /// Convert floating-point seconds to ticks, rounding to the nearest tick.
    pub fn from_seconds(seconds: f64, timescale: i32) -> Self {
        Self {
            value: (seconds * timescale as f64).round() as i64,
            timescale,
        }
    }

    /// This timestamp expressed in seconds.
    pub fn seconds(&self) -> f64 {
        self.value as f64 / self.timescale as f64
    }
}

/// A session clock anchored to the moment recording started.
#[derive(Debug, Clone)]
pub struct SessionClock {
    /// The instant recording started.
    epoch: Instant,

    /// Wall-clock time at epoch (ISO 8601 string).
    epoch_wall: String,
}

impl SessionClock {
    /// Create a new session clock anchored to now.
    pub fn start() -> Self {
        Self {
            epoch: Instant::now(),
            epoch_wall: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Seconds elapsed since the session started.
    pub fn elapsed_secs(&self) -> f64 {
        self.epoch.elapsed().as_secs_f64()
    }

    /// Wall-clock time at session start.
    pub fn epoch_wall(&self) -> &str {
        &self.epoch_wall
    }
}
