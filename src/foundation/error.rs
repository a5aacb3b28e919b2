/// Convenience result alias used across the crate.
pub type SkeneResult<T> = Result<T, SkeneError>;

/// Error type for scene construction, rendering and scheduling.
///
/// `Structural` marks misuse of the API (unknown element tags, raw text children,
/// containers rendered under the wrong parent, rendering deleted nodes). Those are
/// never transient and callers should treat them as bugs.
#[derive(thiserror::Error, Debug)]
pub enum SkeneError {
    /// A descriptor (color, path, prop value) could not be interpreted.
    #[error("validation error: {0}")]
    Validation(String),

    /// The scene tree was used in a way it does not support.
    #[error("structural error: {0}")]
    Structural(String),

    /// The native graphics backend failed to provide a resource.
    #[error("backend error: {0}")]
    Backend(String),

    /// JSON encoding or decoding failed.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Any other error, with its source preserved.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SkeneError {
    /// Build a [`SkeneError::Validation`].
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`SkeneError::Structural`].
    pub fn structural(msg: impl Into<String>) -> Self {
        Self::Structural(msg.into())
    }

    /// Build a [`SkeneError::Backend`].
    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }

    /// Build a [`SkeneError::Serde`].
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// Return `true` for API-misuse errors.
    pub fn is_structural(&self) -> bool {
        matches!(self, Self::Structural(_))
    }
}

impl From<serde_json::Error> for SkeneError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serde(err.to_string())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
