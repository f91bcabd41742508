//! Caching pixel buffer pool factory.

use std::sync::Mutex;

use scenecap_common::error::{RecorderError, RecorderResult};
use scenecap_surface_core::PixelBufferAttributes;

use crate::pool::PixelBufferPool;

/// Creates pixel buffer pools on demand, caching the last one.
///
/// Asking for the same attributes twice returns the cached pool unchanged, so
/// the per-frame path pays one lock and an equality check instead of a
/// reallocation. Asking for different attributes (a resize, a format change)
/// builds a new pool and replaces the cache; the old pool is released once
/// its last in-flight buffer drops.
#[derive(Default)]
pub struct PixelBufferPoolFactory {
    cached: Mutex<Option<PixelBufferPool>>,
}

impl PixelBufferPoolFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a pool for `attributes`, reusing the cached pool when they match.
    ///
    /// Zero dimensions fail with `ZeroWidth`/`ZeroHeight` before any
    /// allocation is attempted.
    pub fn make_with_attributes(
        &self,
        attributes: &PixelBufferAttributes,
    ) -> RecorderResult<PixelBufferPool> {
        if attributes.width == 0 {
            return Err(RecorderError::ZeroWidth);
        }
        if attributes.height == 0 {
            return Err(RecorderError::ZeroHeight);
        }

        let mut cached = self.cached.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(pool) = cached.as_ref() {
            if pool.attributes() == attributes {
                return Ok(pool.clone());
            }
            tracing::debug!(
                old = ?pool.attributes(),
                new = ?attributes,
                "pixel buffer attributes changed, rebuilding pool"
            );
        }

        let pool = PixelBufferPool::new(attributes.clone())?;
        *cached = Some(pool.clone());
        Ok(pool)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use scenecap_surface_core::PixelFormat;

    #[test]
    fn identical_attributes_return_cached_pool() {
        let factory = PixelBufferPoolFactory::new();
        let attrs = PixelBufferAttributes::new(64, 64, PixelFormat::Bgra8);

        let first = factory.make_with_attributes(&attrs).unwrap();
        let second = factory.make_with_attributes(&attrs).unwrap();
        assert!(first.same_pool(&second));
    }

    #[test]
    fn changed_attributes_replace_the_pool() {
        let factory = PixelBufferPoolFactory::new();
        let attrs = PixelBufferAttributes::new(64, 64, PixelFormat::Bgra8);
        let resized = PixelBufferAttributes::new(128, 64, PixelFormat::Bgra8);

        let first = factory.make_with_attributes(&attrs).unwrap();
        let second = factory.make_with_attributes(&resized).unwrap();
        assert!(!first.same_pool(&second));

        // Asking again for the new attributes stays on the replacement.
        let third = factory.make_with_attributes(&resized).unwrap();
        assert!(second.same_pool(&third));
    }

    #[test]
    fn zero_dimensions_never_reach_the_allocator() {
        let factory = PixelBufferPoolFactory::new();

        let zero_width = PixelBufferAttributes::new(0, 64, PixelFormat::Bgra8);
        assert!(matches!(
            factory.make_with_attributes(&zero_width),
            Err(RecorderError::ZeroWidth)
        ));

        let zero_height = PixelBufferAttributes::new(64, 0, PixelFormat::Bgra8);
        assert!(matches!(
            factory.make_with_attributes(&zero_height),
            Err(RecorderError::ZeroHeight)
        ));

        // Neither failure poisoned the cache.
        let valid = PixelBufferAttributes::new(64, 64, PixelFormat::Bgra8);
        assert!(factory.make_with_attributes(&valid).is_ok());
    }

    proptest! {
        #[test]
        fn caching_and_validation_hold_for_arbitrary_dimensions(
            width in 0u32..64,
            height in 0u32..64,
        ) {
            let factory = PixelBufferPoolFactory::new();
            let attrs = PixelBufferAttributes::new(width, height, PixelFormat::Bgra8);
            match factory.make_with_attributes(&attrs) {
                Ok(pool) => {
                    prop_assert!(width > 0 && height > 0);
                    let again = factory.make_with_attributes(&attrs).unwrap();
                    prop_assert!(pool.same_pool(&again));
                }
                Err(RecorderError::ZeroWidth) => prop_assert_eq!(width, 0),
                Err(RecorderError::ZeroHeight) => prop_assert_eq!(height, 0),
                Err(other) => {
                    return Err(TestCaseError::fail(format!("unexpected error: {other}")));
                }
            }
        }
    }
}
