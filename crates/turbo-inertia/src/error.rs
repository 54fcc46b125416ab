//! Error types for configuration and the request pipeline.

use thiserror::Error;
use turbo_adapter::AdapterError;
use turbo_flash::FlashError;

use crate::dev_server::DevServerError;
use crate::pipeline::Capability;

/// Errors raised while registering the integration.
///
/// These are fatal: a misconfigured integration must not start serving.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Required configuration missing or malformed.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Configuration file could not be parsed.
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// The development asset server could not be started.
    #[error("dev server error: {0}")]
    DevServer(#[from] DevServerError),

    /// The request pipeline was assembled incorrectly.
    #[error("pipeline error: {0}")]
    Pipeline(#[from] PipelineError),
}

/// Errors that abort a request pipeline.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// An upstream facility a step needs is not present.
    #[error("missing dependency: {0}")]
    MissingDependency(String),

    /// A step was registered before the step providing what it needs.
    #[error("step '{step}' requires {capability}, which no earlier step provides")]
    OutOfOrder {
        /// Name of the rejected step.
        step: &'static str,
        /// Capability with no earlier provider.
        capability: Capability,
    },

    /// Two steps share a name.
    #[error("duplicate step: {0}")]
    DuplicateStep(&'static str),

    /// The development asset server failed while intercepting.
    #[error("dev server error: {0}")]
    DevServer(#[from] DevServerError),

    /// The protocol core could not be created.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// An adapter call was rejected.
    #[error("adapter error: {0}")]
    Adapter(#[from] AdapterError),
}

impl From<FlashError> for PipelineError {
    fn from(err: FlashError) -> Self {
        match err {
            FlashError::MissingDependency(message) => Self::MissingDependency(message),
        }
    }
}
