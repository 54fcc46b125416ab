//! Per-request context passed through the pipeline and to the handler.

use std::sync::Arc;

use bytes::Bytes;
use http::{Request, Response};
use turbo_flash::Flash;
use turbo_host::{HostRequest, Reply, RequestId};

use crate::pipeline::Capability;

/// One request, its pending reply and whatever the pipeline attached.
#[derive(Debug)]
pub struct Exchange<C> {
    request: Arc<HostRequest>,
    reply: Reply,
    flash: Option<Flash>,
    inertia: Option<C>,
}

impl<C> Exchange<C> {
    /// Start an exchange for a request.
    pub fn new(request: HostRequest) -> Self {
        Self {
            request: Arc::new(request),
            reply: Reply::new(),
            flash: None,
            inertia: None,
        }
    }

    /// Start an exchange from an `http::Request`.
    pub fn from_http(request: Request<Bytes>) -> Self {
        Self::new(HostRequest::new(request))
    }

    /// The request.
    pub fn request(&self) -> &HostRequest {
        &self.request
    }

    /// Shared handle to the request.
    pub fn request_handle(&self) -> Arc<HostRequest> {
        Arc::clone(&self.request)
    }

    /// The pending reply.
    pub fn reply(&self) -> &Reply {
        &self.reply
    }

    /// Request identifier.
    pub fn request_id(&self) -> &RequestId {
        self.request.id()
    }

    /// Flash store, once attached.
    pub fn flash(&self) -> Option<&Flash> {
        self.flash.as_ref()
    }

    /// Protocol core, once initialized.
    pub fn inertia(&self) -> Option<&C> {
        self.inertia.as_ref()
    }

    /// Mutable protocol core, once initialized.
    pub fn inertia_mut(&mut self) -> Option<&mut C> {
        self.inertia.as_mut()
    }

    /// Whether a capability is present on this exchange.
    pub fn has(&self, capability: Capability) -> bool {
        match capability {
            Capability::Session => self.request.session().is_some(),
            Capability::Flash => self.flash.is_some(),
            Capability::Protocol => self.inertia.is_some(),
        }
    }

    /// Finish the exchange into an `http::Response`.
    pub fn into_response(self) -> Response<Bytes> {
        self.reply.to_response()
    }

    pub(crate) fn attach_flash(&mut self, flash: Flash) {
        self.flash = Some(flash);
    }

    pub(crate) fn attach_inertia(&mut self, core: C) {
        self.inertia = Some(core);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use turbo_host::Session;

    fn request_with_session() -> Request<Bytes> {
        let mut request = Request::builder()
            .uri("/users")
            .header("x-request-id", "req-9")
            .body(Bytes::new())
            .unwrap();
        request.extensions_mut().insert(Session::new());
        request
    }

    #[test]
    fn test_exchange_starts_empty() {
        let exchange: Exchange<()> = Exchange::from_http(request_with_session());

        assert_eq!(exchange.request_id().as_str(), "req-9");
        assert!(exchange.has(Capability::Session));
        assert!(!exchange.has(Capability::Flash));
        assert!(!exchange.has(Capability::Protocol));
        assert!(!exchange.reply().is_sent());
    }

    #[test]
    fn test_exchange_attachments() {
        let mut exchange: Exchange<u32> = Exchange::from_http(request_with_session());
        let flash = Flash::attach(exchange.request().session()).unwrap();
        exchange.attach_flash(flash);
        exchange.attach_inertia(7);

        assert!(exchange.has(Capability::Flash));
        *exchange.inertia_mut().unwrap() += 1;
        assert_eq!(exchange.inertia(), Some(&8));
    }

    #[test]
    fn test_exchange_without_session() {
        let exchange: Exchange<()> =
            Exchange::from_http(Request::builder().uri("/").body(Bytes::new()).unwrap());

        assert!(!exchange.has(Capability::Session));
    }

    #[test]
    fn test_into_response() {
        let exchange: Exchange<()> = Exchange::from_http(request_with_session());
        exchange.reply().status(201).unwrap();
        exchange.reply().send("done");

        let response = exchange.into_response();
        assert_eq!(response.status(), http::StatusCode::CREATED);
        assert_eq!(response.body().as_ref(), b"done");
    }
}
