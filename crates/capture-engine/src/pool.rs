//! Reusable pixel buffer pool.
//!
//! A pool owns a bounded free list of frame-sized byte buffers, all shaped by
//! one [`PixelBufferAttributes`] value. Checked-out buffers travel to the
//! sink; dropping a buffer returns its memory to the pool it came from. A
//! pool that has been replaced (attributes changed) dies together with its
//! last in-flight buffer.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Weak};

use scenecap_common::error::{RecorderError, RecorderResult};
use scenecap_surface_core::{PixelBufferAttributes, PixelFormat};

/// Buffer checkout was requested while every pool slot is in flight.
pub const ERR_POOL_EXHAUSTED: i32 = -1;
/// The requested buffer geometry overflows addressable size.
pub const ERR_SIZE_OVERFLOW: i32 = -2;
/// The destination buffer does not match the frame being written.
pub const ERR_SIZE_MISMATCH: i32 = -3;

struct PoolInner {
    attributes: PixelBufferAttributes,
    bytes_per_row: usize,
    free: Mutex<Vec<Box<[u8]>>>,
    allocated: AtomicUsize,
    reused: AtomicUsize,
}

impl PoolInner {
    fn recycle(&self, data: Box<[u8]>) {
        self.free
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(data);
    }
}

/// A bounded pool of reusable pixel buffers keyed by one attribute set.
#[derive(Clone)]
pub struct PixelBufferPool {
    inner: Arc<PoolInner>,
}

impl PixelBufferPool {
    /// Create a pool for the given attributes.
    ///
    /// The attributes must already be validated; geometry that overflows
    /// addressable size is rejected with a creation error.
    pub(crate) fn new(attributes: PixelBufferAttributes) -> RecorderResult<Self> {
        let bytes_per_row = attributes.bytes_per_row();
        let size = (attributes.height as usize)
            .checked_mul(bytes_per_row)
            .filter(|&s| s > 0 && s <= isize::MAX as usize)
            .ok_or(RecorderError::PoolCreation {
                code: ERR_SIZE_OVERFLOW,
            })?;

        tracing::debug!(
            width = attributes.width,
            height = attributes.height,
            format = %attributes.format,
            buffer_bytes = size,
            "pixel buffer pool created"
        );

        Ok(Self {
            inner: Arc::new(PoolInner {
                attributes,
                bytes_per_row,
                free: Mutex::new(Vec::new()),
                allocated: AtomicUsize::new(0),
                reused: AtomicUsize::new(0),
            }),
        })
    }

    /// The attributes this pool serves.
    pub fn attributes(&self) -> &PixelBufferAttributes {
        &self.inner.attributes
    }

    /// Check a buffer out of the pool, reusing returned memory when possible.
    ///
    /// Fails with a pixel buffer error once `max_buffers` buffers are in
    /// flight; callers drop the frame rather than growing without bound.
    pub fn make_buffer(&self) -> RecorderResult<PixelBuffer> {
        let attrs = &self.inner.attributes;

        let recycled = self
            .inner
            .free
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop();

        let data = match recycled {
            Some(data) => {
                self.inner.reused.fetch_add(1, Ordering::Relaxed);
                data
            }
            None => {
                let allocated = self.inner.allocated.load(Ordering::Relaxed);
                if allocated >= attrs.max_buffers as usize {
                    return Err(RecorderError::PixelBuffer {
                        code: ERR_POOL_EXHAUSTED,
                    });
                }
                self.inner.allocated.fetch_add(1, Ordering::Relaxed);
                vec![0u8; attrs.height as usize * self.inner.bytes_per_row].into_boxed_slice()
            }
        };

        Ok(PixelBuffer {
            data: Some(data),
            width: attrs.width,
            height: attrs.height,
            format: attrs.format,
            bytes_per_row: self.inner.bytes_per_row,
            pool: Arc::downgrade(&self.inner),
        })
    }

    /// Buffers allocated over the pool's lifetime (bounded by
    /// `max_buffers`).
    pub fn allocated_count(&self) -> usize {
        self.inner.allocated.load(Ordering::Relaxed)
    }

    /// Checkouts served from the free list instead of a fresh allocation.
    pub fn reuse_count(&self) -> usize {
        self.inner.reused.load(Ordering::Relaxed)
    }

    /// Whether `other` is the same pool instance.
    pub fn same_pool(&self, other: &PixelBufferPool) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl std::fmt::Debug for PixelBufferPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PixelBufferPool")
            .field("attributes", &self.inner.attributes)
            .field("allocated", &self.allocated_count())
            .field("reused", &self.reuse_count())
            .finish()
    }
}

/// One frame's pixel memory, checked out from a pool.
///
/// Ownership transfers with the value; dropping it returns the memory to the
/// originating pool's free list.
pub struct PixelBuffer {
    data: Option<Box<[u8]>>,
    width: u32,
    height: u32,
    format: PixelFormat,
    bytes_per_row: usize,
    pool: Weak<PoolInner>,
}

impl PixelBuffer {
    /// Frame width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Frame height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Pixel layout of the backing memory.
    pub fn format(&self) -> PixelFormat {
        self.format
    }

    /// Row stride of the backing memory in bytes.
    pub fn bytes_per_row(&self) -> usize {
        self.bytes_per_row
    }

    /// The backing memory, `height * bytes_per_row` bytes.
    pub fn data(&self) -> &[u8] {
        self.data.as_deref().unwrap_or(&[])
    }

    /// Mutable backing memory.
    pub fn data_mut(&mut self) -> &mut [u8] {
        self.data.as_deref_mut().unwrap_or(&mut [])
    }

    /// Rewrite the buffer's pixel format tag after an in-place conversion.
    pub(crate) fn set_format(&mut self, format: PixelFormat) {
        self.format = format;
    }
}

impl Drop for PixelBuffer {
    fn drop(&mut self) {
        if let (Some(data), Some(pool)) = (self.data.take(), self.pool.upgrade()) {
            pool.recycle(data);
        }
    }
}

impl std::fmt::Debug for PixelBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PixelBuffer")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("format", &self.format)
            .field("bytes_per_row", &self.bytes_per_row)
            .finish()
    }
}
