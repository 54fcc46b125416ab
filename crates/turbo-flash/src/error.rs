//! Flash error types.

use thiserror::Error;

/// Errors that can occur when attaching a flash store.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FlashError {
    /// A facility the flash store depends on was not installed.
    #[error("missing dependency: {0}")]
    MissingDependency(String),
}
