//! Scenecap Common Utilities
//!
//! Shared infrastructure for all Scenecap crates:
//! - Error types and result aliases
//! - Media time-base utilities for output timestamps
//! - Tracing/logging initialization
//! - Configuration loading

pub mod config;
pub mod error;
pub mod logging;
pub mod time;

pub use config::*;
pub use error::*;
pub use time::*;
