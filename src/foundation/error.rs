/// Crate-wide result alias.
pub type LarmorResult<T> = Result<T, LarmorError>;

#[derive(thiserror::Error, Debug)]
/// Error type shared by scene construction, evaluation, rendering and encoding.
pub enum LarmorError {
    /// Invalid user or scene input.
    #[error("validation error: {0}")]
    Validation(String),

    /// Invalid animation definition or sampling request.
    #[error("animation error: {0}")]
    Animation(String),

    /// Failure while evaluating, compiling or rendering a frame.
    #[error("evaluation error: {0}")]
    Evaluation(String),

    /// Failure while loading or preparing an external asset.
    #[error("asset error: {0}")]
    Asset(String),

    /// Failure while reading or writing serialized data.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped source error with context.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl LarmorError {
    /// Build [`LarmorError::Validation`].
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build [`LarmorError::Animation`].
    pub fn animation(msg: impl Into<String>) -> Self {
        Self::Animation(msg.into())
    }

    /// Build [`LarmorError::Evaluation`].
    pub fn evaluation(msg: impl Into<String>) -> Self {
        Self::Evaluation(msg.into())
    }

    /// Build [`LarmorError::Asset`].
    pub fn asset(msg: impl Into<String>) -> Self {
        Self::Asset(msg.into())
    }

    /// Build [`LarmorError::Serde`].
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
