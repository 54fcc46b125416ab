//! Incoming request view.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use bytes::Bytes;
use http::{Extensions, HeaderMap, Method, Request, Uri};

use crate::session::Session;

/// Header carrying an upstream request identifier.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

static NEXT_REQUEST: AtomicU64 = AtomicU64::new(1);

/// Unique request identifier for tracing.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestId(String);

impl RequestId {
    /// Generate a new request ID.
    pub fn generate() -> Self {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis();
        let seq = NEXT_REQUEST.fetch_add(1, Ordering::Relaxed);
        Self(format!("{:x}-{:04x}", millis, seq))
    }

    /// Create from an existing ID string.
    pub fn from_string(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Reuse the upstream `x-request-id` header when present, otherwise generate one.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        headers
            .get(REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
            .map(Self::from_string)
            .unwrap_or_else(Self::generate)
    }

    /// Get the ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Read-only view of an incoming request.
///
/// The session layer (external to this crate) attaches its bag as a
/// [`Session`] value in the request extensions before the pipeline runs.
#[derive(Debug)]
pub struct HostRequest {
    id: RequestId,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    extensions: Extensions,
    body: Bytes,
}

impl HostRequest {
    /// Wrap an `http::Request`.
    pub fn new(request: Request<Bytes>) -> Self {
        let (parts, body) = request.into_parts();
        Self {
            id: RequestId::from_headers(&parts.headers),
            method: parts.method,
            uri: parts.uri,
            headers: parts.headers,
            extensions: parts.extensions,
            body,
        }
    }

    /// Request identifier.
    pub fn id(&self) -> &RequestId {
        &self.id
    }

    /// HTTP method.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Full request URI.
    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    /// Path plus query string, as the client sent it.
    ///
    /// Empty for authority-form targets.
    pub fn target(&self) -> &str {
        self.uri.path_and_query().map(|pq| pq.as_str()).unwrap_or("")
    }

    /// Request headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Get a header value by name (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Request extensions.
    pub fn extensions(&self) -> &Extensions {
        &self.extensions
    }

    /// Session bag, if a session layer ran before us.
    pub fn session(&self) -> Option<&Session> {
        self.extensions.get::<Session>()
    }

    /// Raw request body.
    pub fn body(&self) -> &Bytes {
        &self.body
    }
}

impl From<Request<Bytes>> for HostRequest {
    fn from(request: Request<Bytes>) -> Self {
        Self::new(request)
    }
}
