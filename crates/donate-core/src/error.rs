//! Error types for the donate core
//!
//! Normalization itself is total and never fails. The only fallible
//! operation is decoding JSON text before normalization.

/// Donate core error types
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Input text was not valid JSON
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for donate core operations
pub type Result<T> = std::result::Result<T, Error>;
