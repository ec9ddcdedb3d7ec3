use crate::raster::PixelFormat;

/// Convenience result type used across the crate.
pub type PrettifierResult<T> = Result<T, PrettifierError>;

/// Top-level error taxonomy used by pipeline, session and export APIs.
#[derive(thiserror::Error, Debug)]
pub enum PrettifierError {
    /// Invalid user-provided configuration or image data.
    #[error("validation error: {0}")]
    Validation(String),

    /// Buffer allocation exceeded backend limits or memory.
    #[error("allocation error: {width}x{height} {format:?}: {reason}")]
    Allocation {
        /// Requested width in pixels.
        width: u32,
        /// Requested height in pixels.
        height: u32,
        /// Requested pixel format.
        format: PixelFormat,
        /// Why the allocation was refused.
        reason: String,
    },

    /// A backend failed to execute a pass.
    #[error("pass error: {0}")]
    Pass(String),

    /// Encoding or writing an output image failed.
    #[error("export error: {0}")]
    Export(String),

    /// Errors when serializing or deserializing configuration.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PrettifierError {
    /// Build a [`PrettifierError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`PrettifierError::Allocation`] value.
    pub fn allocation(
        width: u32,
        height: u32,
        format: PixelFormat,
        reason: impl Into<String>,
    ) -> Self {
        Self::Allocation {
            width,
            height,
            format,
            reason: reason.into(),
        }
    }

    /// Build a [`PrettifierError::Pass`] value.
    pub fn pass(msg: impl Into<String>) -> Self {
        Self::Pass(msg.into())
    }

    /// Build a [`PrettifierError::Export`] value.
    pub fn export(msg: impl Into<String>) -> Self {
        Self::Export(msg.into())
    }

    /// Build a [`PrettifierError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
