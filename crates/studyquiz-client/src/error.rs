//! Profile store error types.

use thiserror::Error;

/// Errors that can occur when reading or writing user profiles.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store rejected the request.
    #[error("store error (HTTP {status}): {message}")]
    ApiError { status: u16, message: String },

    /// A network error occurred.
    #[error("network error: {0}")]
    NetworkError(String),

    /// A stored document could not be decoded.
    #[error("malformed document: {0}")]
    Decode(String),

    /// The user id cannot be used as a document key.
    #[error("invalid document key: {0:?}")]
    InvalidKey(String),
}

/// Reject ids that would escape a collection or directory.
pub(crate) fn validate_key(uid: &str) -> Result<(), StoreError> {
    let bad = uid.is_empty()
        || uid == "."
        || uid == ".."
        || uid.contains(['/', '\\'])
        || uid.chars().any(char::is_control);
    if bad {
        return Err(StoreError::InvalidKey(uid.to_string()));
    }
    Ok(())
}
