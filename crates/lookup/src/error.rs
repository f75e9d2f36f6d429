use thiserror::Error;

/// Errors from external lookup calls.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new variants
/// in future versions without breaking downstream code.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LookupError {
    /// The request could not be completed (connect failure, timeout).
    #[error("request failed: {0}")]
    Http(String),

    /// The upstream service returned a non-success status.
    #[error("upstream returned {status}: {body}")]
    Status { status: u16, body: String },

    /// The response body was missing an expected field.
    #[error("malformed response: {0}")]
    Malformed(String),
}

pub type Result<T> = std::result::Result<T, LookupError>;
