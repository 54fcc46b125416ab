//! Host binding errors.

use thiserror::Error;

/// Errors raised by the host reply primitives.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HostError {
    /// Status code outside the range the host accepts.
    #[error("invalid status code: {0}")]
    InvalidStatus(u16),

    /// Header name is not a valid HTTP token.
    #[error("invalid header name: {0}")]
    InvalidHeaderName(String),

    /// Header value contains forbidden bytes.
    #[error("invalid value for header '{0}'")]
    InvalidHeaderValue(String),
}
