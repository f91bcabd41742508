//! Immediate-context pixel buffer production.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use scenecap_common::error::{RecorderError, RecorderResult};
use scenecap_surface_core::{ImmediateContext, PixelBufferAttributes};

use crate::convert;
use crate::pool::{PixelBuffer, ERR_SIZE_MISMATCH};
use crate::producer::PixelBufferProducer;
use crate::settings::VideoSettings;

/// Produces pixel buffers by reading an immediate-mode context's framebuffer
/// straight into pool memory.
///
/// There is no drawable to intercept on this path; the context's readback
/// delivers rows bottom-up, so the producer flips the frame top-down before
/// handing it off.
pub struct ImmediatePixelBufferProducer {
    context: Arc<dyn ImmediateContext>,
    writing: AtomicBool,
}

impl ImmediatePixelBufferProducer {
    pub fn new(context: Arc<dyn ImmediateContext>) -> Self {
        Self {
            context,
            writing: AtomicBool::new(false),
        }
    }
}

impl PixelBufferProducer for ImmediatePixelBufferProducer {
    fn recommended_pixel_buffer_attributes(&self) -> PixelBufferAttributes {
        let (width, height) = self.context.size();
        PixelBufferAttributes::new(width, height, self.context.pixel_format())
    }

    fn recommended_video_settings(&self) -> VideoSettings {
        let (width, height) = self.context.size();
        VideoSettings::recommended(width, height)
    }

    fn is_writing(&self) -> bool {
        self.writing.load(Ordering::Acquire)
    }

    fn start_writing(&self) {
        self.writing.store(true, Ordering::Release);
    }

    fn stop_writing(&self) {
        self.writing.store(false, Ordering::Release);
    }

    fn write_in(&self, buffer: &mut PixelBuffer) -> RecorderResult<()> {
        if self.context.size() != (buffer.width(), buffer.height()) {
            return Err(RecorderError::PixelBuffer {
                code: ERR_SIZE_MISMATCH,
            });
        }

        let source_format = self.context.pixel_format();
        let target_format = buffer.format();
        let bytes_per_row = buffer.bytes_per_row();
        let height = buffer.height() as usize;

        self.context.read_pixels(buffer.data_mut(), bytes_per_row)?;
        convert::flip_rows_in_place(buffer.data_mut(), bytes_per_row, height);
        convert::convert_format_in_place(buffer.data_mut(), source_format, target_format);
        Ok(())
    }
}
