//! Backend types and errors.

use std::fmt;

/// Errors from the HTTP transport layer.
///
/// Carries transport failures only. An HTTP response with a non-success
/// status is *not* an error at this layer; the strategies decide what to do
/// with it (return it un-cached).
#[derive(Debug, Clone, PartialEq)]
pub enum BackendError {
    /// Request could not be sent or the connection failed mid-flight
    Http(String),
    /// Response arrived but could not be read or decoded
    InvalidResponse(String),
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendError::Http(msg) => write!(f, "HTTP error: {}", msg),
            BackendError::InvalidResponse(msg) => write!(f, "Invalid response: {}", msg),
        }
    }
}

impl std::error::Error for BackendError {}
