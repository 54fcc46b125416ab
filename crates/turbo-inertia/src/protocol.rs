//! Seam to the Inertia protocol core.
//!
//! The core (page objects, partial reloads, version checks, SSR) lives
//! outside this crate. The pipeline builds one core per request through a
//! [`ProtocolFactory`] and stores it on the exchange.

use std::fmt;
use std::sync::Arc;

use turbo_adapter::Adapter;

use crate::config::ResolvedConfig;
use crate::dev_server::DevServer;
use crate::error::PipelineError;
use crate::shared::SharedProps;

/// Everything a protocol core is built from.
pub struct ProtocolContext {
    /// Adapter over this request and its reply.
    pub adapter: Box<dyn Adapter>,
    /// Process-wide configuration.
    pub config: Arc<ResolvedConfig>,
    /// Dev server handle for server-side module loading, outside production.
    pub dev_server: Option<Arc<dyn DevServer>>,
    /// Shared data bound to this request's flash store.
    pub shared: SharedProps,
}

impl fmt::Debug for ProtocolContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProtocolContext")
            .field("method", &self.adapter.method())
            .field("url", &self.adapter.url())
            .field("config", &self.config)
            .field("dev_server", &self.dev_server.is_some())
            .field("shared", &self.shared)
            .finish()
    }
}

/// Builds the per-request protocol core.
pub trait ProtocolFactory: Send + Sync + 'static {
    /// The request-scoped core exposed to handlers as `exchange.inertia()`.
    type Core: Send + 'static;

    /// Create a core for one request.
    fn create(&self, context: ProtocolContext) -> Result<Self::Core, PipelineError>;
}
