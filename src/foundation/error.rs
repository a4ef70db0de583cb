/// Convenience result type used across kinetype.
pub type KinetypeResult<T> = Result<T, KinetypeError>;

/// Top-level error taxonomy of the render/export pipeline.
///
/// Only required preconditions (`MissingContent`, `Unsupported`, `Validation`) abort an export
/// before anything is allocated. Best-effort stages (sound, transcoding) log and degrade instead
/// of returning these.
#[derive(thiserror::Error, Debug)]
pub enum KinetypeError {
    /// Invalid user-provided request data.
    #[error("validation error: {0}")]
    Validation(String),

    /// The request has nothing to animate (e.g. image mode without an image).
    #[error("missing content: {0}")]
    MissingContent(String),

    /// The host cannot record/encode (no encoder, no supported container).
    #[error("unsupported: {0}")]
    Unsupported(String),

    /// Failure while a recording session was running.
    #[error("recording error: {0}")]
    Recording(String),

    /// External transcoder failure.
    #[error("transcode error: {0}")]
    Transcode(String),

    /// Sound synthesis or decode failure.
    #[error("audio error: {0}")]
    Audio(String),

    /// The export was cancelled through its token.
    #[error("export cancelled")]
    Cancelled,

    /// Errors when serializing or deserializing requests.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl KinetypeError {
    /// Build a [`KinetypeError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`KinetypeError::MissingContent`] value.
    pub fn missing_content(msg: impl Into<String>) -> Self {
        Self::MissingContent(msg.into())
    }

    /// Build a [`KinetypeError::Unsupported`] value.
    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::Unsupported(msg.into())
    }

    /// Build a [`KinetypeError::Recording`] value.
    pub fn recording(msg: impl Into<String>) -> Self {
        Self::Recording(msg.into())
    }

    /// Build a [`KinetypeError::Transcode`] value.
    pub fn transcode(msg: impl Into<String>) -> Self {
        Self::Transcode(msg.into())
    }

    /// Build a [`KinetypeError::Audio`] value.
    pub fn audio(msg: impl Into<String>) -> Self {
        Self::Audio(msg.into())
    }

    /// Build a [`KinetypeError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// True for errors raised before any recording resources exist.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            Self::Validation(_) | Self::MissingContent(_) | Self::Unsupported(_)
        )
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
