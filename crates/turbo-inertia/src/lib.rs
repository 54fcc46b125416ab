//! Inertia protocol integration for the turbo host.
//!
//! Registration resolves the configuration once and assembles a fixed
//! request pipeline:
//! 1. `dev-server` - offers the request to an owned dev server (development only)
//! 2. `flash` - attaches the session-backed [`Flash`](turbo_flash::Flash) store
//! 3. `inertia` - builds the protocol core through a [`ProtocolFactory`]
//!
//! Each request then reaches the application [`Handler`] with
//! `exchange.flash()` and `exchange.inertia()` populated.
//!
//! # Example
//!
//! ```rust,ignore
//! use turbo_inertia::{InertiaConfig, InertiaService, PluginOptions};
//!
//! let options = PluginOptions::new(InertiaConfig::new().with_version("1.0.0"));
//! let service = InertiaService::register(options, MyFactory).await?;
//!
//! let response = service.handle(request, &MyHandler).await;
//! ```

pub mod config;
pub mod dev_server;
pub mod error;
pub mod exchange;
pub mod pipeline;
pub mod protocol;
pub mod service;
pub mod shared;

pub use config::{
    resolve_config, InertiaConfig, Mode, PluginOptions, ResolvedConfig, SsrSettings,
    MODE_ENV_VAR,
};
pub use dev_server::{
    DevServer, DevServerError, DevServerLauncher, DevServerOptions, DevServerSource, Intercept,
};
pub use error::{ConfigError, PipelineError};
pub use exchange::Exchange;
pub use pipeline::{
    Capability, Completion, DevMiddleware, FlashAttach, ProtocolInit, Sequencer, Step,
    StepDescriptor, StepOutcome,
};
pub use protocol::{ProtocolContext, ProtocolFactory};
pub use service::{Handler, InertiaService, INTERNAL_ERROR_BODY};
pub use shared::{SharedContext, SharedData, SharedProps, SharedProvider};

pub use turbo_adapter::{Adapter, HeaderEntry, HostAdapter, StatusOrUrl};
pub use turbo_flash::Flash;
pub use turbo_host::{HostRequest, Reply, RequestId, Session};
