//! Buffered response handle.

use std::sync::Arc;

use bytes::Bytes;
use http::header::{HeaderName, HeaderValue, LOCATION};
use http::{HeaderMap, Response, StatusCode};
use parking_lot::Mutex;

use crate::HostError;

#[derive(Debug)]
struct ReplyState {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
    sent: bool,
}

impl Default for ReplyState {
    fn default() -> Self {
        Self {
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            body: Bytes::new(),
            sent: false,
        }
    }
}

/// Pending response for one request.
///
/// Clones share the same underlying state, so a handle can be given to the
/// adapter, the dev server hook and the dispatcher at the same time. Once
/// [`Reply::send`] or [`Reply::redirect`] has run the reply is sent; later
/// sends are logged and dropped.
#[derive(Debug, Clone, Default)]
pub struct Reply {
    state: Arc<Mutex<ReplyState>>,
}

impl Reply {
    /// Create an empty `200 OK` reply.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the response status.
    pub fn status(&self, code: u16) -> Result<(), HostError> {
        let status = StatusCode::from_u16(code).map_err(|_| HostError::InvalidStatus(code))?;
        self.state.lock().status = status;
        Ok(())
    }

    /// Current response status.
    pub fn status_code(&self) -> StatusCode {
        self.state.lock().status
    }

    /// Set a response header, replacing any previous value.
    pub fn header(&self, name: &str, value: &str) -> Result<(), HostError> {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|_| HostError::InvalidHeaderName(name.to_string()))?;
        let value = HeaderValue::from_str(value)
            .map_err(|_| HostError::InvalidHeaderValue(name.to_string()))?;
        self.state.lock().headers.insert(name, value);
        Ok(())
    }

    /// Get a response header value (case-insensitive).
    pub fn header_value(&self, name: &str) -> Option<String> {
        self.state
            .lock()
            .headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(String::from)
    }

    /// Check whether a response header is set.
    pub fn has_header(&self, name: &str) -> bool {
        self.state.lock().headers.contains_key(name)
    }

    /// Snapshot of the response headers.
    pub fn headers(&self) -> HeaderMap {
        self.state.lock().headers.clone()
    }

    /// Send the body and finish the reply.
    pub fn send(&self, body: impl Into<Bytes>) {
        let mut state = self.state.lock();
        if state.sent {
            tracing::warn!("reply already sent; dropping body");
            return;
        }
        state.body = body.into();
        state.sent = true;
    }

    /// Send a redirect to `location` with the given status.
    pub fn redirect(&self, location: &str, status: u16) -> Result<(), HostError> {
        let status = StatusCode::from_u16(status).map_err(|_| HostError::InvalidStatus(status))?;
        let location = HeaderValue::from_str(location)
            .map_err(|_| HostError::InvalidHeaderValue(LOCATION.to_string()))?;
        {
            let mut state = self.state.lock();
            if state.sent {
                tracing::warn!("reply already sent; dropping redirect");
                return Ok(());
            }
            state.status = status;
            state.headers.insert(LOCATION, location);
        }
        self.send(Bytes::new());
        Ok(())
    }

    /// Drop pending headers and status so a fresh reply can be written.
    ///
    /// Does nothing once the reply is sent.
    pub fn reset(&self) {
        let mut state = self.state.lock();
        if state.sent {
            return;
        }
        state.status = StatusCode::OK;
        state.headers.clear();
        state.body = Bytes::new();
    }

    /// Whether the reply has been sent.
    pub fn is_sent(&self) -> bool {
        self.state.lock().sent
    }

    /// Current response body.
    pub fn body(&self) -> Bytes {
        self.state.lock().body.clone()
    }

    /// Build the outgoing `http::Response`.
    pub fn to_response(&self) -> Response<Bytes> {
        let state = self.state.lock();
        let mut response = Response::new(state.body.clone());
        *response.status_mut() = state.status;
        *response.headers_mut() = state.headers.clone();
        response
    }
}
