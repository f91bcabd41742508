//! Error types shared across Scenecap crates.

/// Top-level error type for Scenecap operations.
#[derive(Debug, thiserror::Error)]
pub enum RecorderError {
    /// The view's compositing layer cannot be recorded from.
    #[error("Recordable layer unavailable for this view")]
    RecordableLayerUnavailable,

    /// The view has no immediate-mode rendering context.
    #[error("Immediate rendering context unavailable for this view")]
    ContextUnavailable,

    /// The execution environment has no usable GPU presentation subsystem.
    #[error("Unsupported environment: {message}")]
    UnsupportedEnvironment { message: String },

    /// The view reports a rendering API this library does not know.
    #[error("Unknown rendering API")]
    UnknownRenderingApi,

    /// Pixel buffer attributes carried a zero width.
    #[error("Pixel buffer attributes have zero width")]
    ZeroWidth,

    /// Pixel buffer attributes carried a zero height.
    #[error("Pixel buffer attributes have zero height")]
    ZeroHeight,

    /// The pool allocator rejected the requested attributes.
    #[error("Pixel buffer pool creation failed (code {code})")]
    PoolCreation { code: i32 },

    /// A pixel buffer could not be checked out or filled.
    #[error("Pixel buffer error (code {code})")]
    PixelBuffer { code: i32 },

    /// The pool factory cannot produce pools for the negotiated attributes.
    #[error("Pixel buffer pool factory failed")]
    PixelBufferFactory,

    /// No drawable has been captured yet for the current frame.
    #[error("No drawable is ready for capture")]
    DrawableNotReady,

    /// A drawable's texture could not be accessed or copied.
    #[error("Texture error: {message}")]
    Texture { message: String },

    /// The presentation surface failed to acquire or reconfigure.
    #[error("Surface error: {message}")]
    Surface { message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using RecorderError.
pub type RecorderResult<T> = Result<T, RecorderError>;

impl RecorderError {
    pub fn unsupported_environment(msg: impl Into<String>) -> Self {
        Self::UnsupportedEnvironment {
            message: msg.into(),
        }
    }

    pub fn texture(msg: impl Into<String>) -> Self {
        Self::Texture {
            message: msg.into(),
        }
    }

    pub fn surface(msg: impl Into<String>) -> Self {
        Self::Surface {
            message: msg.into(),
        }
    }

    /// Whether this error ends a session, as opposed to a per-frame condition
    /// that only costs the current frame.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            Self::DrawableNotReady
                | Self::PixelBuffer { .. }
                | Self::Texture { .. }
                | Self::Surface { .. }
        )
    }
}
