//! Compositor-backed pixel buffer production.

use std::sync::Arc;

use scenecap_common::error::{RecorderError, RecorderResult};
use scenecap_surface_core::{PixelBufferAttributes, RecordableLayer, RecordingLayer};

use crate::convert;
use crate::pool::{PixelBuffer, ERR_SIZE_MISMATCH};
use crate::producer::PixelBufferProducer;
use crate::settings::VideoSettings;

/// Produces pixel buffers from the drawable a compositing layer presented
/// this frame.
///
/// Relies on the [`RecordingLayer`] decorator having intercepted the frame's
/// acquisition: `write_in` reads the decorator's last-drawable slot and
/// extracts the texture synchronously, before the compositor can reclaim the
/// drawable for reuse.
pub struct CompositorPixelBufferProducer {
    layer: Arc<RecordingLayer>,
}

impl CompositorPixelBufferProducer {
    pub fn new(layer: Arc<RecordingLayer>) -> Self {
        Self { layer }
    }

    /// The interception decorator this producer reads from.
    pub fn layer(&self) -> &Arc<RecordingLayer> {
        &self.layer
    }
}

impl PixelBufferProducer for CompositorPixelBufferProducer {
    fn recommended_pixel_buffer_attributes(&self) -> PixelBufferAttributes {
        let (width, height) = self.layer.drawable_size();
        PixelBufferAttributes::new(width, height, self.layer.pixel_format())
    }

    fn recommended_video_settings(&self) -> VideoSettings {
        let (width, height) = self.layer.drawable_size();
        VideoSettings::recommended(width, height)
    }

    fn is_writing(&self) -> bool {
        self.layer.is_recording()
    }

    fn start_writing(&self) {
        self.layer.begin_recording();
    }

    fn stop_writing(&self) {
        self.layer.end_recording();
    }

    fn write_in(&self, buffer: &mut PixelBuffer) -> RecorderResult<()> {
        let drawable = self
            .layer
            .last_drawable()
            .ok_or(RecorderError::DrawableNotReady)?;

        // A resize between acquisition and capture would make the copy run
        // past the buffer rows; reject the stale frame instead.
        if drawable.size() != (buffer.width(), buffer.height()) {
            return Err(RecorderError::PixelBuffer {
                code: ERR_SIZE_MISMATCH,
            });
        }

        let source_format = drawable.pixel_format();
        let target_format = buffer.format();
        let bytes_per_row = buffer.bytes_per_row();
        drawable.copy_into(buffer.data_mut(), bytes_per_row)?;
        convert::convert_format_in_place(buffer.data_mut(), source_format, target_format);
        Ok(())
    }
}
