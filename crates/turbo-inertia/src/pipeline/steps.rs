//! Built-in pipeline steps.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use turbo_adapter::{Adapter, HostAdapter};
use turbo_flash::Flash;

use crate::config::ResolvedConfig;
use crate::dev_server::{DevServer, Intercept};
use crate::error::PipelineError;
use crate::exchange::Exchange;
use crate::pipeline::{Capability, Step, StepDescriptor, StepOutcome};
use crate::protocol::{ProtocolContext, ProtocolFactory};
use crate::shared::SharedProps;

/// Name of the dev server step.
pub const DEV_SERVER_STEP: &str = "dev-server";

/// Name of the flash step.
pub const FLASH_STEP: &str = "flash";

/// Name of the protocol init step.
pub const PROTOCOL_STEP: &str = "inertia";

/// Offers each request to an owned dev server.
pub struct DevMiddleware {
    server: Arc<dyn DevServer>,
}

impl DevMiddleware {
    /// Wrap a running dev server.
    pub fn new(server: Arc<dyn DevServer>) -> Self {
        Self { server }
    }
}

impl fmt::Debug for DevMiddleware {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DevMiddleware").finish_non_exhaustive()
    }
}

#[async_trait]
impl<C: Send + 'static> Step<C> for DevMiddleware {
    fn descriptor(&self) -> StepDescriptor {
        StepDescriptor::new(DEV_SERVER_STEP)
    }

    async fn run(&self, exchange: &mut Exchange<C>) -> Result<StepOutcome, PipelineError> {
        match self
            .server
            .intercept(exchange.request(), exchange.reply())
            .await?
        {
            Intercept::Handled => Ok(StepOutcome::Terminated),
            Intercept::Next => Ok(StepOutcome::Continue),
        }
    }
}

/// Attaches the request's flash store.
#[derive(Debug, Default, Clone, Copy)]
pub struct FlashAttach;

#[async_trait]
impl<C: Send + 'static> Step<C> for FlashAttach {
    fn descriptor(&self) -> StepDescriptor {
        StepDescriptor::new(FLASH_STEP)
            .requires(Capability::Session)
            .provides(Capability::Flash)
    }

    async fn run(&self, exchange: &mut Exchange<C>) -> Result<StepOutcome, PipelineError> {
        let flash = Flash::attach(exchange.request().session())?;
        exchange.attach_flash(flash);
        Ok(StepOutcome::Continue)
    }
}

/// Builds the request's protocol core.
pub struct ProtocolInit<F> {
    factory: Arc<F>,
    config: Arc<ResolvedConfig>,
}

impl<F: ProtocolFactory> ProtocolInit<F> {
    /// Create the step around a factory and the resolved configuration.
    pub fn new(factory: Arc<F>, config: Arc<ResolvedConfig>) -> Self {
        Self { factory, config }
    }
}

impl<F> fmt::Debug for ProtocolInit<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProtocolInit")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl<F: ProtocolFactory> Step<F::Core> for ProtocolInit<F> {
    fn descriptor(&self) -> StepDescriptor {
        StepDescriptor::new(PROTOCOL_STEP)
            .requires(Capability::Flash)
            .provides(Capability::Protocol)
    }

    async fn run(&self, exchange: &mut Exchange<F::Core>) -> Result<StepOutcome, PipelineError> {
        let flash = exchange.flash().cloned().ok_or_else(|| {
            PipelineError::MissingDependency(format!(
                "{} requires {}",
                PROTOCOL_STEP,
                Capability::Flash.supplier()
            ))
        })?;

        let adapter = HostAdapter::new(exchange.request_handle(), exchange.reply().clone());
        let shared = SharedProps::new(
            self.config.shared_data().clone(),
            flash,
            adapter.method(),
            adapter.url(),
        );
        let context = ProtocolContext {
            adapter: Box::new(adapter),
            config: Arc::clone(&self.config),
            dev_server: self.config.dev_server().cloned(),
            shared,
        };

        let core = self.factory.create(context)?;
        exchange.attach_inertia(core);
        Ok(StepOutcome::Continue)
    }
}
