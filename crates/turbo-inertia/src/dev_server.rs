//! Development asset server hook.
//!
//! The asset server itself (bundler, module graph, HMR) lives outside this
//! crate. The pipeline only needs its request intercept, and the protocol
//! core receives the handle for server-side module loading.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use turbo_host::{HostRequest, Reply};

/// Errors reported by the development asset server.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DevServerError {
    /// The server could not be started.
    #[error("failed to launch dev server: {0}")]
    Launch(String),

    /// The server failed while handling a request.
    #[error("dev server intercept failed: {0}")]
    Intercept(String),
}

/// Result of offering a request to the dev server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intercept {
    /// The dev server answered the request; nothing else may run.
    Handled,
    /// Not an asset request; continue with the pipeline.
    Next,
}

/// A running development asset server.
#[async_trait]
pub trait DevServer: Send + Sync {
    /// Offer a request to the server's middleware stack.
    async fn intercept(
        &self,
        request: &HostRequest,
        reply: &Reply,
    ) -> Result<Intercept, DevServerError>;
}

/// Starts a development asset server.
#[async_trait]
pub trait DevServerLauncher: Send + Sync {
    /// Launch a server with the given options.
    async fn launch(
        &self,
        options: &DevServerOptions,
    ) -> Result<Arc<dyn DevServer>, DevServerError>;
}

/// Options passed to [`DevServerLauncher::launch`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DevServerOptions {
    /// Run as middleware inside the host instead of a standalone server.
    #[serde(default = "default_middleware_mode")]
    pub middleware_mode: bool,
    /// Application type hint for the bundler.
    #[serde(default = "default_app_type")]
    pub app_type: String,
    /// Project root; defaults to the working directory.
    #[serde(default)]
    pub root: Option<PathBuf>,
}

fn default_middleware_mode() -> bool {
    true
}

fn default_app_type() -> String {
    "custom".to_string()
}

impl Default for DevServerOptions {
    fn default() -> Self {
        Self {
            middleware_mode: default_middleware_mode(),
            app_type: default_app_type(),
            root: None,
        }
    }
}

impl DevServerOptions {
    /// Set the project root.
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = Some(root.into());
        self
    }

    /// Set the application type hint.
    pub fn with_app_type(mut self, app_type: impl Into<String>) -> Self {
        self.app_type = app_type.into();
        self
    }
}

/// Where the dev server comes from.
#[derive(Clone, Default)]
pub enum DevServerSource {
    /// No dev server.
    #[default]
    Disabled,
    /// A server the caller already runs and routes requests to.
    ///
    /// The pipeline passes it to the protocol core but never intercepts
    /// requests for it.
    External(Arc<dyn DevServer>),
    /// A server this integration launches once and owns.
    Managed(Arc<dyn DevServerLauncher>),
}

impl fmt::Debug for DevServerSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disabled => write!(f, "Disabled"),
            Self::External(_) => write!(f, "External(..)"),
            Self::Managed(_) => write!(f, "Managed(..)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dev_server_options_default() {
        let options = DevServerOptions::default();

        assert!(options.middleware_mode);
        assert_eq!(options.app_type, "custom");
        assert!(options.root.is_none());
    }

    #[test]
    fn test_dev_server_options_builder() {
        let options = DevServerOptions::default()
            .with_root("frontend")
            .with_app_type("spa");

        assert_eq!(options.root, Some(PathBuf::from("frontend")));
        assert_eq!(options.app_type, "spa");
    }

    #[test]
    fn test_dev_server_source_debug() {
        assert_eq!(format!("{:?}", DevServerSource::default()), "Disabled");
    }
}
