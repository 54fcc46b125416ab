//! The adapter capability interface.

use std::any::Any;

use bytes::Bytes;
use serde::Serialize;

use crate::AdapterError;

/// Status used by `redirect(url)` when no explicit status is given.
pub const DEFAULT_REDIRECT_STATUS: u16 = 302;

/// A request header lookup result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderEntry {
    /// Header present once.
    One(String),
    /// Header repeated; values in arrival order.
    Many(Vec<String>),
}

impl HeaderEntry {
    /// First value of the header.
    pub fn first(&self) -> &str {
        match self {
            Self::One(value) => value,
            Self::Many(values) => values.first().map(String::as_str).unwrap_or(""),
        }
    }

    /// All values of the header.
    pub fn values(&self) -> Vec<&str> {
        match self {
            Self::One(value) => vec![value.as_str()],
            Self::Many(values) => values.iter().map(String::as_str).collect(),
        }
    }
}

/// First argument of [`Adapter::redirect`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusOrUrl {
    /// Explicit status; the url must follow.
    Status(u16),
    /// Target url with the default redirect status.
    Url(String),
}

impl From<u16> for StatusOrUrl {
    fn from(status: u16) -> Self {
        Self::Status(status)
    }
}

impl From<&str> for StatusOrUrl {
    fn from(url: &str) -> Self {
        Self::Url(url.to_string())
    }
}

impl From<String> for StatusOrUrl {
    fn from(url: String) -> Self {
        Self::Url(url)
    }
}

/// Object-safe JSON serialization, implemented for every `Serialize` type.
pub trait JsonBody {
    /// Serialize to a JSON byte vector.
    fn to_json_vec(&self) -> Result<Vec<u8>, serde_json::Error>;
}

impl<T: Serialize + ?Sized> JsonBody for T {
    fn to_json_vec(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }
}

/// Uniform view over one host request/response pair.
///
/// Writes go to the wrapped response only. Calling a body-send method twice
/// is a caller bug; implementations are not required to guard against it.
pub trait Adapter: Send + Sync {
    /// Look up a request header. The name is matched case-insensitively.
    fn header(&self, name: &str) -> Option<HeaderEntry>;

    /// Set a response header. Invalid names or values are dropped.
    fn set_header(&self, name: &str, value: &str);

    /// Request method, `"GET"` when the host has none.
    fn method(&self) -> String;

    /// Request url (path and query), `"/"` when the host has none.
    fn url(&self) -> String;

    /// Set the response status.
    fn set_status(&self, code: u16);

    /// Send `data` as JSON.
    ///
    /// Serialization failures produce a `500` with a fixed error body
    /// instead of an error.
    fn json(&self, data: &dyn JsonBody);

    /// Send an HTML document.
    fn html(&self, content: &str);

    /// Send a text body; content type defaults to `text/html`.
    fn send(&self, content: &str) {
        self.html(content);
    }

    /// Send raw bytes without touching the content type.
    fn send_raw(&self, body: Bytes);

    /// Redirect with either `(url)` or `(status, url)`.
    fn redirect(&self, target: StatusOrUrl, url: Option<&str>) -> Result<(), AdapterError>;

    /// Redirect to `url` with the default status.
    fn redirect_to(&self, url: &str) -> Result<(), AdapterError> {
        self.redirect(StatusOrUrl::Url(url.to_string()), None)
    }

    /// Redirect to `url` with an explicit status.
    fn redirect_with(&self, status: u16, url: &str) -> Result<(), AdapterError> {
        self.redirect(StatusOrUrl::Status(status), Some(url))
    }

    /// Finish the response with an optional payload.
    fn end(&self, data: Option<Bytes>);

    /// Whether the host already sent the response.
    fn is_sent(&self) -> bool;

    /// The underlying host request, for host-specific code paths.
    fn raw_request(&self) -> &dyn Any;

    /// The underlying host response, for host-specific code paths.
    fn raw_response(&self) -> &dyn Any;
}
