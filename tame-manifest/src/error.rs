use thiserror::Error;

/// A [`crate::Document::set`] call could not be applied.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    #[error("path `{path}` not found")]
    PathNotFound { path: String },

    #[error("`{path}` is not a scalar value")]
    NotAScalar { path: String },
}
