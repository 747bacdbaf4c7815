/// Convenience result type used across flipbook.
pub type TextureResult<T> = Result<T, TextureError>;

/// Top-level error taxonomy used by engine APIs.
#[derive(thiserror::Error, Debug)]
pub enum TextureError {
    /// A size, width, height or split hint was negative, zero where forbidden, or mismatched.
    #[error("dimension error: {0}")]
    Dimension(String),

    /// Coordinate math would leave the representable range.
    #[error("overflow error: {0}")]
    Overflow(String),

    /// A pixel access fell outside a frame or plane.
    #[error("pixel out of bounds: ({x}, {y})")]
    PixelOutOfBounds {
        /// Offending x coordinate.
        x: i64,
        /// Offending y coordinate.
        y: i64,
    },

    /// A predefined frame index fell outside `0..len`.
    #[error("frame index out of bounds: {index} (frames: {len})")]
    FrameIndexOutOfBounds {
        /// Offending index.
        index: i64,
        /// Number of predefined frames.
        len: usize,
    },

    /// A frame view was used after the event that issued it completed.
    #[error("illegal frame reference: view used outside the event that issued it")]
    IllegalFrameReference,

    /// Pixel storage was already released.
    #[error("image closed: pixel storage has been released")]
    ImageClosed,

    /// An event was delivered to a texture after it was closed.
    #[error("texture closed: no further events may be delivered")]
    TextureClosed,

    /// Upload was requested at a negative device coordinate.
    #[error("negative upload point: ({x}, {y})")]
    NegativeUploadPoint {
        /// Requested x coordinate.
        x: i32,
        /// Requested y coordinate.
        y: i32,
    },

    /// Two plugins reported different values for the same texture property.
    #[error("metadata conflict: '{key}' reported as both {first} and {second}")]
    MetadataConflict {
        /// Property name (`frame width`, `blur`, ...).
        key: String,
        /// First reported value.
        first: String,
        /// Conflicting value.
        second: String,
    },

    /// A metadata section was malformed or referenced impossible frames.
    #[error("metadata error: {0}")]
    InvalidMetadata(String),

    /// The resource source has no entry for the requested location.
    #[error("resource not found: {location}")]
    ResourceNotFound {
        /// Display form of the missing location.
        location: String,
    },

    /// A resource location string was malformed.
    #[error("invalid location: {0}")]
    InvalidLocation(String),

    /// Plugin registration or lookup failed.
    #[error("plugin error: {0}")]
    Plugin(String),

    /// A render-thread-only operation ran elsewhere.
    #[error("not on render thread: {0}")]
    NotRenderThread(String),

    /// Load options failed validation.
    #[error("config error: {0}")]
    Config(String),

    /// Image bytes could not be decoded.
    #[error("decode error: {0}")]
    Decode(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl TextureError {
    /// Build a [`TextureError::Dimension`] value.
    pub fn dimension(msg: impl Into<String>) -> Self {
        Self::Dimension(msg.into())
    }

    /// Build a [`TextureError::Overflow`] value.
    pub fn overflow(msg: impl Into<String>) -> Self {
        Self::Overflow(msg.into())
    }

    /// Build a [`TextureError::PixelOutOfBounds`] value.
    pub fn pixel_out_of_bounds(x: impl Into<i64>, y: impl Into<i64>) -> Self {
        Self::PixelOutOfBounds {
            x: x.into(),
            y: y.into(),
        }
    }

    /// Build a [`TextureError::InvalidMetadata`] value.
    pub fn metadata(msg: impl Into<String>) -> Self {
        Self::InvalidMetadata(msg.into())
    }

    /// Build a [`TextureError::MetadataConflict`] value.
    pub fn conflict(
        key: impl Into<String>,
        first: impl std::fmt::Display,
        second: impl std::fmt::Display,
    ) -> Self {
        Self::MetadataConflict {
            key: key.into(),
            first: first.to_string(),
            second: second.to_string(),
        }
    }

    /// Build a [`TextureError::InvalidLocation`] value.
    pub fn location(msg: impl Into<String>) -> Self {
        Self::InvalidLocation(msg.into())
    }

    /// Build a [`TextureError::Plugin`] value.
    pub fn plugin(msg: impl Into<String>) -> Self {
        Self::Plugin(msg.into())
    }

    /// Build a [`TextureError::NotRenderThread`] value.
    pub fn not_render_thread(msg: impl Into<String>) -> Self {
        Self::NotRenderThread(msg.into())
    }

    /// Build a [`TextureError::Config`] value.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Build a [`TextureError::Decode`] value.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Return `true` for errors a caller can recover from by fixing its arguments.
    pub fn is_bounds(&self) -> bool {
        matches!(
            self,
            Self::PixelOutOfBounds { .. } | Self::FrameIndexOutOfBounds { .. }
        )
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
