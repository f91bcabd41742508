//! Scene video input: the per-recording-session orchestrator.
//!
//! `SceneVideoInput` sits between a rendered view and a video writer. It
//! selects the producer variant for the view's rendering API, owns the pool
//! factory, and on every render callback pulls one pixel buffer through the
//! producer and forwards it, timestamped, to the registered sink.

use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};
use std::sync::Mutex;

use scenecap_common::config::{RecorderConfig, RecordingDefaults};
use scenecap_common::error::{RecorderError, RecorderResult};
use scenecap_common::time::{MediaTime, SessionClock};
use scenecap_surface_core::{RenderingApi, SceneRecordableView};

use crate::factory::PixelBufferPoolFactory;
use crate::pool::PixelBuffer;
use crate::producer::{
    CompositorPixelBufferProducer, ImmediatePixelBufferProducer, PixelBufferProducer,
};
use crate::settings::{Codec, VideoSettings};

/// Downstream consumer of filled, timestamped pixel buffers.
///
/// Buffer ownership transfers with the call; dropping the buffer returns its
/// memory to the pool.
pub trait PixelBufferSink: Send + Sync {
    fn did_output(&self, buffer: PixelBuffer, time: MediaTime);
}

/// Lifecycle state of a video input session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VideoInputState {
    /// Session created but not started.
    Idle,
    /// Frames are being captured and forwarded.
    Started,
    /// Session stopped; frame callbacks are ignored again.
    Stopped,
}

const STATE_IDLE: u8 = 0;
const STATE_STARTED: u8 = 1;
const STATE_STOPPED: u8 = 2;

/// Captures one view's rendered frames into pooled pixel buffers and feeds
/// them to a sink.
pub struct SceneVideoInput {
    time_scale: i32,
    defaults: RecordingDefaults,
    producer: Box<dyn PixelBufferProducer>,
    pool_factory: PixelBufferPoolFactory,
    state: AtomicU8,
    clock: Mutex<Option<SessionClock>>,
    dropped_frames: AtomicU64,
    sink: Mutex<Option<Box<dyn PixelBufferSink>>>,
}

impl std::fmt::Debug for SceneVideoInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SceneVideoInput")
            .field("time_scale", &self.time_scale)
            .field("state", &self.state.load(Ordering::SeqCst))
            .field("dropped_frames", &self.dropped_frames.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}

impl SceneVideoInput {
    /// Create a video input for `view`, selecting the producer variant from
    /// the view's rendering API.
    pub fn new(view: &dyn SceneRecordableView, time_scale: i32) -> RecorderResult<Self> {
        Self::with_defaults(view, time_scale, RecordingDefaults::default())
    }

    /// Create a video input using time scale and buffer hints from `config`.
    pub fn with_config(view: &dyn SceneRecordableView, config: &RecorderConfig) -> RecorderResult<Self> {
        Self::with_defaults(
            view,
            config.recording.time_scale,
            config.recording.clone(),
        )
    }

    fn with_defaults(
        view: &dyn SceneRecordableView,
        time_scale: i32,
        defaults: RecordingDefaults,
    ) -> RecorderResult<Self> {
        let producer: Box<dyn PixelBufferProducer> = match view.rendering_api() {
            RenderingApi::Gpu => {
                let layer = view
                    .recording_layer()
                    .ok_or(RecorderError::RecordableLayerUnavailable)?;
                Box::new(CompositorPixelBufferProducer::new(layer))
            }
            RenderingApi::Immediate => {
                let context = view
                    .immediate_context()
                    .ok_or(RecorderError::ContextUnavailable)?;
                Box::new(ImmediatePixelBufferProducer::new(context))
            }
            RenderingApi::Unknown => return Err(RecorderError::UnknownRenderingApi),
        };
        Self::from_producer(producer, time_scale, defaults)
    }

    /// Create a video input over an already-constructed producer.
    pub fn from_producer(
        producer: Box<dyn PixelBufferProducer>,
        time_scale: i32,
        defaults: RecordingDefaults,
    ) -> RecorderResult<Self> {
        producer
            .recommended_pixel_buffer_attributes()
            .validate()
            .map_err(|_| RecorderError::PixelBufferFactory)?;

        Ok(Self {
            time_scale,
            defaults,
            producer,
            pool_factory: PixelBufferPoolFactory::new(),
            state: AtomicU8::new(STATE_IDLE),
            clock: Mutex::new(None),
            dropped_frames: AtomicU64::new(0),
            sink: Mutex::new(None),
        })
    }

    /// Register the downstream sink, replacing any previous one.
    pub fn set_sink(&self, sink: Box<dyn PixelBufferSink>) {
        *self.sink.lock().unwrap_or_else(|e| e.into_inner()) = Some(sink);
    }

    /// Current lifecycle state.
    pub fn state(&self) -> VideoInputState {
        match self.state.load(Ordering::Acquire) {
            STATE_STARTED => VideoInputState::Started,
            STATE_STOPPED => VideoInputState::Stopped,
            _ => VideoInputState::Idle,
        }
    }

    /// Whether frame callbacks are currently being captured.
    pub fn is_started(&self) -> bool {
        self.state.load(Ordering::Acquire) == STATE_STARTED
    }

    /// The session's time scale (ticks per second).
    pub fn time_scale(&self) -> i32 {
        self.time_scale
    }

    /// Frames dropped since the session started.
    pub fn dropped_frames(&self) -> u64 {
        self.dropped_frames.load(Ordering::Relaxed)
    }

    /// Seconds since `start()`, or 0 when never started.
    pub fn elapsed_secs(&self) -> f64 {
        self.clock
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .as_ref()
            .map(|c| c.elapsed_secs())
            .unwrap_or(0.0)
    }

    /// Writer settings derived from the view's current geometry, using the
    /// configured codec when it names a known one.
    pub fn recommended_video_settings(&self) -> VideoSettings {
        let mut settings = self.producer.recommended_video_settings();
        if let Some(codec) = Codec::from_name(&self.defaults.video_codec) {
            settings.codec = codec;
        }
        settings
    }

    /// Begin capturing frames. Idempotent.
    pub fn start(&self) {
        self.producer.start_writing();
        if self.state.swap(STATE_STARTED, Ordering::AcqRel) != STATE_STARTED {
            let clock = SessionClock::start();
            tracing::info!(
                time_scale = self.time_scale,
                epoch_wall = clock.epoch_wall(),
                "scene video input started"
            );
            *self.clock.lock().unwrap_or_else(|e| e.into_inner()) = Some(clock);
        }
    }

    /// Stop capturing frames and release the source. Idempotent.
    ///
    /// An extraction already running for the current frame is not aborted;
    /// stopping only prevents the next one from starting.
    pub fn stop(&self) {
        self.producer.stop_writing();
        if self.state.swap(STATE_STOPPED, Ordering::AcqRel) == STATE_STARTED {
            tracing::info!(
                duration_secs = self.elapsed_secs(),
                dropped_frames = self.dropped_frames(),
                "scene video input stopped"
            );
        }
    }

    /// Per-frame callback from the render loop, carrying the scene time in
    /// seconds since session start.
    ///
    /// A no-op unless the session is started. Per-frame failures drop the
    /// frame and leave the session running; the error is returned so callers
    /// can observe it, but no state changes and the next frame proceeds
    /// normally.
    pub fn did_render_scene(&self, time_secs: f64) -> RecorderResult<()> {
        if !self.is_started() {
            return Ok(());
        }

        match self.produce_frame(time_secs) {
            Ok(()) => Ok(()),
            Err(err) => {
                let dropped = self.dropped_frames.fetch_add(1, Ordering::Relaxed) + 1;
                if matches!(err, RecorderError::DrawableNotReady) {
                    tracing::debug!(dropped_frames = dropped, "frame skipped, no drawable ready");
                } else {
                    tracing::warn!(error = %err, dropped_frames = dropped, "frame dropped");
                }
                Err(err)
            }
        }
    }

    fn produce_frame(&self, time_secs: f64) -> RecorderResult<()> {
        let mut attributes = self.producer.recommended_pixel_buffer_attributes();
        attributes.bytes_per_row_alignment = self.defaults.bytes_per_row_alignment;
        attributes.max_buffers = self.defaults.max_pool_buffers;

        let pool = self.pool_factory.make_with_attributes(&attributes)?;
        let mut buffer = pool.make_buffer()?;
        self.producer.write_in(&mut buffer)?;

        let time = MediaTime::from_seconds(time_secs, self.time_scale);
        if let Some(sink) = self.sink.lock().unwrap_or_else(|e| e.into_inner()).as_ref() {
            sink.did_output(buffer, time);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scenecap_surface_core::{PixelBufferAttributes, PixelFormat};
    use std::sync::atomic::{AtomicBool, AtomicUsize};
    use std::sync::Arc;

    struct MockProducer {
        attrs: PixelBufferAttributes,
        writing: AtomicBool,
        writes: AtomicUsize,
        fail_writes: AtomicBool,
    }

    impl MockProducer {
        fn new(width: u32, height: u32) -> Arc<Self> {
            Arc::new(Self {
                attrs: PixelBufferAttributes::new(width, height, PixelFormat::Bgra8),
                writing: AtomicBool::new(false),
                writes: AtomicUsize::new(0),
                fail_writes: AtomicBool::new(false),
            })
        }
    }

    impl PixelBufferProducer for Arc<MockProducer> {
        fn recommended_pixel_buffer_attributes(&self) -> PixelBufferAttributes {
            self.attrs.clone()
        }

        fn recommended_video_settings(&self) -> VideoSettings {
            VideoSettings::recommended(self.attrs.width, self.attrs.height)
        }

        fn is_writing(&self) -> bool {
            self.writing.load(Ordering::SeqCst)
        }

        fn start_writing(&self) {
            self.writing.store(true, Ordering::SeqCst);
        }

        fn stop_writing(&self) {
            self.writing.store(false, Ordering::SeqCst);
        }

        fn write_in(&self, buffer: &mut PixelBuffer) -> RecorderResult<()> {
            if self.fail_writes.load(Ordering::SeqCst) {
                return Err(RecorderError::texture("mock texture failure"));
            }
            self.writes.fetch_add(1, Ordering::SeqCst);
            buffer.data_mut().fill(0xAB);
            Ok(())
        }
    }

    #[derive(Default)]
    struct CollectingSink {
        times: Mutex<Vec<MediaTime>>,
        data_ptrs: Mutex<Vec<usize>>,
    }

    impl PixelBufferSink for Arc<CollectingSink> {
        fn did_output(&self, buffer: PixelBuffer, time: MediaTime) {
            self.times.lock().unwrap().push(time);
            self.data_ptrs.lock().unwrap().push(buffer.data().as_ptr() as usize);
        }
    }

    fn session_with(
        producer: Arc<MockProducer>,
    ) -> (SceneVideoInput, Arc<CollectingSink>) {
        let input =
            SceneVideoInput::from_producer(Box::new(producer), 600, RecordingDefaults::default())
                .unwrap();
        let sink = Arc::new(CollectingSink::default());
        input.set_sink(Box::new(sink.clone()));
        (input, sink)
    }

    #[test]
    fn frames_are_ignored_outside_started_state() {
        let producer = MockProducer::new(8, 8);
        let (input, sink) = session_with(producer.clone());

        assert_eq!(input.state(), VideoInputState::Idle);
        input.did_render_scene(0.1).unwrap();
        assert!(sink.times.lock().unwrap().is_empty());

        input.start();
        assert_eq!(input.state(), VideoInputState::Started);
        input.did_render_scene(0.2).unwrap();
        assert_eq!(sink.times.lock().unwrap().len(), 1);

        input.stop();
        assert_eq!(input.state(), VideoInputState::Stopped);
        input.did_render_scene(0.3).unwrap();
        assert_eq!(sink.times.lock().unwrap().len(), 1);
        assert_eq!(producer.writes.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn timestamps_use_the_session_time_scale() {
        let producer = MockProducer::new(8, 8);
        let (input, sink) = session_with(producer);

        input.start();
        input.did_render_scene(1.5).unwrap();

        let times = sink.times.lock().unwrap();
        assert_eq!(times[0], MediaTime::new(900, 600));
    }

    #[test]
    fn start_and_stop_are_idempotent() {
        let producer = MockProducer::new(8, 8);
        let (input, _sink) = session_with(producer.clone());

        input.start();
        input.start();
        assert_eq!(input.state(), VideoInputState::Started);
        assert!(producer.writing.load(Ordering::SeqCst));

        input.stop();
        input.stop();
        assert_eq!(input.state(), VideoInputState::Stopped);
        assert!(!producer.writing.load(Ordering::SeqCst));
    }

    #[test]
    fn pool_memory_is_reused_across_frames() {
        let producer = MockProducer::new(8, 8);
        let (input, sink) = session_with(producer);

        input.start();
        input.did_render_scene(0.1).unwrap();
        input.did_render_scene(0.2).unwrap();

        // The sink dropped the first buffer before the second frame, so the
        // cached pool recycled the same allocation instead of rebuilding.
        let ptrs = sink.data_ptrs.lock().unwrap();
        assert_eq!(ptrs.len(), 2);
        assert_eq!(ptrs[0], ptrs[1]);
    }

    #[test]
    fn failed_frames_drop_without_stopping_the_session() {
        let producer = MockProducer::new(8, 8);
        let (input, sink) = session_with(producer.clone());

        input.start();
        producer.fail_writes.store(true, Ordering::SeqCst);
        assert!(input.did_render_scene(0.1).is_err());
        assert_eq!(input.dropped_frames(), 1);
        assert_eq!(input.state(), VideoInputState::Started);

        producer.fail_writes.store(false, Ordering::SeqCst);
        input.did_render_scene(0.2).unwrap();
        assert_eq!(sink.times.lock().unwrap().len(), 1);
    }

    #[test]
    fn recommended_settings_honor_configured_codec() {
        let producer = MockProducer::new(8, 8);
        let defaults = RecordingDefaults {
            video_codec: "hevc".to_string(),
            ..RecordingDefaults::default()
        };
        let input = SceneVideoInput::from_producer(Box::new(producer), 600, defaults).unwrap();

        let settings = input.recommended_video_settings();
        assert_eq!(settings.codec, Codec::Hevc);
        assert_eq!((settings.width, settings.height), (8, 8));
    }

    #[test]
    fn construction_rejects_unusable_geometry() {
        let producer = MockProducer::new(0, 8);
        let err = SceneVideoInput::from_producer(
            Box::new(producer),
            600,
            RecordingDefaults::default(),
        )
        .unwrap_err();
        assert!(matches!(err, RecorderError::PixelBufferFactory));
    }
}
