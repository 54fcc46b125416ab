//! Adapter error types.

use thiserror::Error;
use turbo_host::HostError;

/// Errors returned by adapter calls.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AdapterError {
    /// The call arguments do not match any accepted shape.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The host rejected the write.
    #[error("host rejected write: {0}")]
    Host(#[from] HostError),
}
