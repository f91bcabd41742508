//! Drawable interception.
//!
//! [`RecordingLayer`] decorates a [`RecordableLayer`] so that the drawable
//! presented each frame stays retrievable by the capture engine, and so that
//! the layer's surfaces stay readable while a recording is active. When no
//! recording is active the decorator is transparent: every operation behaves
//! exactly as on the undecorated layer.

use std::any::Any;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use crate::format::PixelFormat;
use crate::layer::{Drawable, RecordableLayer};

/// Decorator that intercepts drawable acquisition and the framebuffer-only
/// attribute on a compositing layer.
pub struct RecordingLayer {
    inner: Arc<dyn RecordableLayer>,
    recording: AtomicBool,
    last_drawable: Mutex<Option<Arc<dyn Drawable>>>,
    cached_framebuffer_only: Mutex<Option<bool>>,
}

impl RecordingLayer {
    /// Install the decorator over `layer`.
    ///
    /// Idempotent: installing over a layer that already is a `RecordingLayer`
    /// returns the existing decorator instead of stacking a second one.
    pub fn install(layer: Arc<dyn RecordableLayer>) -> Arc<RecordingLayer> {
        if let Ok(existing) = layer.clone().into_any().downcast::<RecordingLayer>() {
            return existing;
        }
        Arc::new(RecordingLayer {
            inner: layer,
            recording: AtomicBool::new(false),
            last_drawable: Mutex::new(None),
            cached_framebuffer_only: Mutex::new(None),
        })
    }

    /// Whether frame interception is currently preserving texture
    /// readability.
    pub fn is_recording(&self) -> bool {
        self.recording.load(Ordering::Acquire)
    }

    /// Begin preserving texture readability for capture. Idempotent.
    ///
    /// The layer's current framebuffer-only value is cached and the real
    /// attribute forced off so presented textures can be read back.
    pub fn begin_recording(&self) {
        if self.recording.swap(true, Ordering::AcqRel) {
            return;
        }
        let current = self.inner.framebuffer_only();
        *self
            .cached_framebuffer_only
            .lock()
            .unwrap_or_else(|e| e.into_inner()) = Some(current);
        if current {
            self.inner.set_framebuffer_only(false);
        }
        tracing::debug!(framebuffer_only = current, "recording layer engaged");
    }

    /// Stop intercepting and restore the cached framebuffer-only value, so
    /// rendering behavior after recording matches pre-recording behavior.
    /// Idempotent.
    pub fn end_recording(&self) {
        if !self.recording.swap(false, Ordering::AcqRel) {
            return;
        }
        let cached = self
            .cached_framebuffer_only
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();
        if let Some(value) = cached {
            self.inner.set_framebuffer_only(value);
        }
        tracing::debug!(restored = ?cached, "recording layer disengaged");
    }

    /// The drawable captured by the most recent acquisition, if any.
    pub fn last_drawable(&self) -> Option<Arc<dyn Drawable>> {
        self.last_drawable
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

impl RecordableLayer for RecordingLayer {
    fn drawable_size(&self) -> (u32, u32) {
        self.inner.drawable_size()
    }

    fn pixel_format(&self) -> PixelFormat {
        self.inner.pixel_format()
    }

    fn framebuffer_only(&self) -> bool {
        if self.is_recording() {
            // Report the value the client believes is in effect, not the
            // suspended real attribute.
            self.cached_framebuffer_only
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .unwrap_or_else(|| self.inner.framebuffer_only())
        } else {
            self.inner.framebuffer_only()
        }
    }

    fn set_framebuffer_only(&self, framebuffer_only: bool) {
        if self.is_recording() {
            *self
                .cached_framebuffer_only
                .lock()
                .unwrap_or_else(|e| e.into_inner()) = Some(framebuffer_only);
        } else {
            self.inner.set_framebuffer_only(framebuffer_only);
        }
    }

    fn next_drawable(&self) -> Option<Arc<dyn Drawable>> {
        let drawable = self.inner.next_drawable();
        *self
            .last_drawable
            .lock()
            .unwrap_or_else(|e| e.into_inner()) = drawable.clone();
        drawable
    }

    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scenecap_common::error::RecorderResult;
    use std::sync::atomic::AtomicUsize;

    struct FakeDrawable;

    impl Drawable for FakeDrawable {
        fn size(&self) -> (u32, u32) {
            (4, 4)
        }

        fn pixel_format(&self) -> PixelFormat {
            PixelFormat::Bgra8
        }

        fn copy_into(&self, _dest: &mut [u8], _dest_bytes_per_row: usize) -> RecorderResult<()> {
            Ok(())
        }

        fn present(&self) {}
    }

    struct FakeLayer {
        framebuffer_only: AtomicBool,
        acquisitions: AtomicUsize,
    }

    impl FakeLayer {
        fn new(framebuffer_only: bool) -> Arc<Self> {
            Arc::new(Self {
                framebuffer_only: AtomicBool::new(framebuffer_only),
                acquisitions: AtomicUsize::new(0),
            })
        }
    }

    impl RecordableLayer for FakeLayer {
        fn drawable_size(&self) -> (u32, u32) {
            (4, 4)
        }

        fn pixel_format(&self) -> PixelFormat {
            PixelFormat::Bgra8
        }

        fn framebuffer_only(&self) -> bool {
            self.framebuffer_only.load(Ordering::SeqCst)
        }

        fn set_framebuffer_only(&self, framebuffer_only: bool) {
            self.framebuffer_only.store(framebuffer_only, Ordering::SeqCst);
        }

        fn next_drawable(&self) -> Option<Arc<dyn Drawable>> {
            self.acquisitions.fetch_add(1, Ordering::SeqCst);
            Some(Arc::new(FakeDrawable))
        }

        fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
            self
        }
    }

    #[test]
    fn transparent_when_not_recording() {
        let inner = FakeLayer::new(true);
        let layer = RecordingLayer::install(inner.clone());

        layer.set_framebuffer_only(false);
        assert!(!inner.framebuffer_only());
        assert!(!layer.framebuffer_only());

        layer.set_framebuffer_only(true);
        assert!(inner.framebuffer_only());
        assert!(layer.framebuffer_only());
    }

    #[test]
    fn recording_caches_instead_of_applying() {
        let inner = FakeLayer::new(true);
        let layer = RecordingLayer::install(inner.clone());

        layer.begin_recording();
        // Real attribute forced readable while recording
        assert!(!inner.framebuffer_only());

        // Client sets are cached, not applied
        layer.set_framebuffer_only(true);
        assert!(!inner.framebuffer_only());
        assert!(layer.framebuffer_only());

        // Stop restores the cached value to the real layer
        layer.end_recording();
        assert!(inner.framebuffer_only());
    }

    #[test]
    fn end_recording_restores_original_value_without_client_sets() {
        let inner = FakeLayer::new(true);
        let layer = RecordingLayer::install(inner.clone());

        layer.begin_recording();
        assert!(!inner.framebuffer_only());
        layer.end_recording();
        assert!(inner.framebuffer_only());
    }

    #[test]
    fn acquisition_always_delegates_and_stores() {
        let inner = FakeLayer::new(false);
        let layer = RecordingLayer::install(inner.clone());

        assert!(layer.last_drawable().is_none());
        let drawable = layer.next_drawable();
        assert!(drawable.is_some());
        assert_eq!(inner.acquisitions.load(Ordering::SeqCst), 1);
        assert!(layer.last_drawable().is_some());
    }

    #[test]
    fn install_is_idempotent() {
        let inner = FakeLayer::new(false);
        let first = RecordingLayer::install(inner);
        let second = RecordingLayer::install(first.clone());
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn begin_and_end_are_idempotent() {
        let inner = FakeLayer::new(true);
        let layer = RecordingLayer::install(inner.clone());

        layer.begin_recording();
        layer.begin_recording();
        assert!(layer.is_recording());
        assert!(!inner.framebuffer_only());

        layer.end_recording();
        layer.end_recording();
        assert!(!layer.is_recording());
        assert!(inner.framebuffer_only());
    }
}
