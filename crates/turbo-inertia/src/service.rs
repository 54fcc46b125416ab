//! Registration and request dispatch.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use http::header::CONTENT_TYPE;
use http::{Request, Response};
use tracing::Instrument;
use turbo_host::Reply;

use crate::config::{resolve_config, PluginOptions, ResolvedConfig};
use crate::error::{ConfigError, PipelineError};
use crate::exchange::Exchange;
use crate::pipeline::{Completion, DevMiddleware, FlashAttach, ProtocolInit, Sequencer};
use crate::protocol::ProtocolFactory;

/// Body sent when a request fails inside the pipeline or the handler.
pub const INTERNAL_ERROR_BODY: &str = "Internal Server Error";

/// Application request handler, run after the pipeline is ready.
#[async_trait]
pub trait Handler<C: Send + 'static>: Send + Sync {
    /// Handle one request.
    async fn call(&self, exchange: &mut Exchange<C>) -> anyhow::Result<()>;
}

/// The registered integration.
///
/// Holds the resolved configuration, the step sequence and the protocol
/// factory. One instance serves every request.
pub struct InertiaService<F: ProtocolFactory> {
    config: Arc<ResolvedConfig>,
    sequencer: Sequencer<F::Core>,
}

impl<F: ProtocolFactory> InertiaService<F> {
    /// Resolve options and assemble the pipeline.
    ///
    /// An owned dev server runs first, then the flash store is attached,
    /// then the protocol core is built.
    pub async fn register(options: PluginOptions, factory: F) -> Result<Self, ConfigError> {
        let config = Arc::new(resolve_config(options).await?);
        let mut sequencer: Sequencer<F::Core> = Sequencer::new();

        if config.owns_dev_server() {
            if let Some(server) = config.dev_server() {
                sequencer.push(DevMiddleware::new(Arc::clone(server)))?;
            }
        }
        sequencer.push(FlashAttach)?;
        sequencer.push(ProtocolInit::new(Arc::new(factory), Arc::clone(&config)))?;

        tracing::info!(
            mode = ?config.mode(),
            root_view = config.root_view(),
            steps = ?sequencer.names(),
            "inertia integration registered"
        );

        Ok(Self { config, sequencer })
    }

    /// Resolved configuration.
    pub fn config(&self) -> &Arc<ResolvedConfig> {
        &self.config
    }

    /// The step sequence.
    pub fn sequencer(&self) -> &Sequencer<F::Core> {
        &self.sequencer
    }

    /// Run the pipeline without a handler.
    pub async fn prepare(
        &self,
        exchange: &mut Exchange<F::Core>,
    ) -> Result<Completion, PipelineError> {
        self.sequencer.run(exchange).await
    }

    /// Serve one request: run the pipeline, then the handler.
    ///
    /// Pipeline and handler failures are logged and answered with a plain
    /// `500`.
    pub async fn handle<H>(&self, request: Request<Bytes>, handler: &H) -> Response<Bytes>
    where
        H: Handler<F::Core> + ?Sized,
    {
        let mut exchange = Exchange::from_http(request);
        let span = tracing::info_span!(
            "request",
            request_id = %exchange.request_id(),
            method = %exchange.request().method(),
            path = exchange.request().uri().path(),
        );

        self.dispatch(&mut exchange, handler).instrument(span).await;
        exchange.into_response()
    }

    async fn dispatch<H>(&self, exchange: &mut Exchange<F::Core>, handler: &H)
    where
        H: Handler<F::Core> + ?Sized,
    {
        match self.sequencer.run(exchange).await {
            Ok(Completion::Ready) => {
                if let Err(err) = handler.call(exchange).await {
                    tracing::error!(error = %err, "handler failed");
                    send_internal_error(exchange.reply());
                }
            }
            Ok(Completion::Terminated { by }) => {
                tracing::debug!(by, "request answered during pipeline");
            }
            Err(err) => {
                tracing::error!(error = %err, "request pipeline aborted");
                send_internal_error(exchange.reply());
            }
        }
    }
}

impl<F: ProtocolFactory> fmt::Debug for InertiaService<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InertiaService")
            .field("config", &self.config)
            .field("sequencer", &self.sequencer)
            .finish()
    }
}

fn send_internal_error(reply: &Reply) {
    if reply.is_sent() {
        tracing::warn!("reply already sent; cannot report failure");
        return;
    }
    reply.reset();
    if let Err(err) = reply
        .status(500)
        .and_then(|_| reply.header(CONTENT_TYPE.as_str(), "text/plain; charset=utf-8"))
    {
        tracing::warn!(error = %err, "failed to prepare error reply");
    }
    reply.send(Bytes::from_static(INTERNAL_ERROR_BODY.as_bytes()));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_send_internal_error() {
        let reply = Reply::new();
        send_internal_error(&reply);

        assert_eq!(reply.status_code(), http::StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            reply.header_value("content-type"),
            Some("text/plain; charset=utf-8".to_string())
        );
        assert_eq!(reply.body().as_ref(), INTERNAL_ERROR_BODY.as_bytes());
    }

    #[test]
    fn test_send_internal_error_drops_pending_headers() {
        let reply = Reply::new();
        reply.header("Location", "/secret").unwrap();
        reply.header("X-Inertia", "true").unwrap();
        reply.status(303).unwrap();
        send_internal_error(&reply);

        assert_eq!(reply.status_code(), http::StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!reply.has_header("location"));
        assert!(!reply.has_header("x-inertia"));
        assert_eq!(reply.headers().len(), 1);
    }

    #[test]
    fn test_send_internal_error_keeps_sent_reply() {
        let reply = Reply::new();
        reply.send("partial");
        send_internal_error(&reply);

        assert_eq!(reply.status_code(), http::StatusCode::OK);
        assert_eq!(reply.body().as_ref(), b"partial");
    }
}
