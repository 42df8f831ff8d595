//! Error types for the comparison engine.

/// Errors that can abort a comparison.
///
/// Only user-supplied code fails: a custom comparator or a type handler.
/// Type mismatches are ordinary diff outcomes and depth truncation is
/// silent; neither is an error.
#[derive(Debug, thiserror::Error)]
pub enum DiffError {
    /// A custom comparator returned an error.
    #[error("custom comparator failed at `{path}`: {message}")]
    Comparator { path: String, message: String },

    /// A type handler returned an error.
    #[error("type handler `{name}` failed at `{path}`: {message}")]
    Handler {
        name: String,
        path: String,
        message: String,
    },
}

/// Convenience alias for comparison results.
pub type DiffResult<T> = Result<T, DiffError>;
