/// Convenience result type used across Scrollyte.
pub type ScrollyteResult<T> = Result<T, ScrollyteError>;

/// Top-level error taxonomy used by engine and site APIs.
#[derive(thiserror::Error, Debug)]
pub enum ScrollyteError {
    /// Invalid user-provided scene, timeline or form data.
    #[error("validation error: {0}")]
    Validation(String),

    /// Errors while resolving or sampling animations.
    #[error("animation error: {0}")]
    Animation(String),

    /// Errors while evaluating engine state for a frame.
    #[error("evaluation error: {0}")]
    Evaluation(String),

    /// A trigger element has no measurable size yet.
    #[error("layout not ready: {0}")]
    LayoutNotReady(String),

    /// A remote collaborator (datastore, email, chat) failed.
    #[error("remote error: {0}")]
    Remote(String),

    /// A unique constraint rejected the write.
    #[error("duplicate entry: {0}")]
    Duplicate(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ScrollyteError {
    /// Build a [`ScrollyteError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`ScrollyteError::Animation`] value.
    pub fn animation(msg: impl Into<String>) -> Self {
        Self::Animation(msg.into())
    }

    /// Build a [`ScrollyteError::Evaluation`] value.
    pub fn evaluation(msg: impl Into<String>) -> Self {
        Self::Evaluation(msg.into())
    }

    /// Build a [`ScrollyteError::LayoutNotReady`] value.
    pub fn layout_not_ready(msg: impl Into<String>) -> Self {
        Self::LayoutNotReady(msg.into())
    }

    /// Build a [`ScrollyteError::Remote`] value.
    pub fn remote(msg: impl Into<String>) -> Self {
        Self::Remote(msg.into())
    }

    /// Build a [`ScrollyteError::Duplicate`] value.
    pub fn duplicate(msg: impl Into<String>) -> Self {
        Self::Duplicate(msg.into())
    }

    /// Build a [`ScrollyteError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// True for unique-constraint conflicts.
    pub fn is_duplicate(&self) -> bool {
        matches!(self, Self::Duplicate(_))
    }
}

impl From<serde_json::Error> for ScrollyteError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serde(e.to_string())
    }
}

impl From<reqwest::Error> for ScrollyteError {
    fn from(e: reqwest::Error) -> Self {
        Self::Remote(e.to_string())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
