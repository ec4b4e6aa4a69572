/// Convenience result type used across the renderer.
pub type ThumbResult<T> = Result<T, ThumbError>;

/// Top-level error taxonomy used by engine APIs.
///
/// Only [`ThumbError::Config`], [`ThumbError::Validation`] and [`ThumbError::Render`] abort a
/// render. [`ThumbError::Resource`] is produced by resource loaders and recovered by the caller
/// with a placeholder.
#[derive(thiserror::Error, Debug)]
pub enum ThumbError {
    /// Unknown keyword, missing field or malformed document.
    #[error("config error: {0}")]
    Config(String),

    /// Structurally invalid document values.
    #[error("validation error: {0}")]
    Validation(String),

    /// A background image or font face could not be loaded.
    #[error("resource error: {0}")]
    Resource(String),

    /// Backend failure while producing the final artifact.
    #[error("render error: {0}")]
    Render(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ThumbError {
    /// Build a [`ThumbError::Config`] value.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Build a [`ThumbError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`ThumbError::Resource`] value.
    pub fn resource(msg: impl Into<String>) -> Self {
        Self::Resource(msg.into())
    }

    /// Build a [`ThumbError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Whether this error must terminate the render.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::Resource(_))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
