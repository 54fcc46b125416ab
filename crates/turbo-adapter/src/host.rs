//! Adapter implementation for the `turbo-host` binding.

use std::any::Any;
use std::sync::Arc;

use bytes::Bytes;
use http::header::CONTENT_TYPE;
use turbo_host::{HostRequest, Reply};

use crate::{Adapter, AdapterError, HeaderEntry, JsonBody, StatusOrUrl, DEFAULT_REDIRECT_STATUS};

/// Body sent when a JSON payload cannot be serialized.
pub const JSON_FAILURE_BODY: &str = r#"{"error":"Failed to serialize JSON"}"#;

const JSON_CONTENT_TYPE: &str = "application/json";
const HTML_CONTENT_TYPE: &str = "text/html";

/// Adapter over a [`HostRequest`] and its [`Reply`].
#[derive(Debug, Clone)]
pub struct HostAdapter {
    request: Arc<HostRequest>,
    reply: Reply,
}

impl HostAdapter {
    /// Wrap a request and the reply that answers it.
    pub fn new(request: Arc<HostRequest>, reply: Reply) -> Self {
        Self { request, reply }
    }

    /// The wrapped request.
    pub fn request(&self) -> &HostRequest {
        &self.request
    }

    /// The wrapped reply.
    pub fn reply(&self) -> &Reply {
        &self.reply
    }

    fn default_content_type(&self, content_type: &str) {
        if !self.reply.has_header(CONTENT_TYPE.as_str()) {
            self.set_header(CONTENT_TYPE.as_str(), content_type);
        }
    }
}

impl Adapter for HostAdapter {
    fn header(&self, name: &str) -> Option<HeaderEntry> {
        let name = name.to_lowercase();
        let mut values: Vec<String> = self
            .request
            .headers()
            .get_all(name.as_str())
            .iter()
            .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
            .collect();

        match values.len() {
            0 => None,
            1 => values.pop().map(HeaderEntry::One),
            _ => Some(HeaderEntry::Many(values)),
        }
    }

    fn set_header(&self, name: &str, value: &str) {
        if let Err(err) = self.reply.header(name, value) {
            tracing::warn!(header = name, error = %err, "dropping response header");
        }
    }

    fn method(&self) -> String {
        match self.request.method().as_str() {
            "" => "GET".to_string(),
            method => method.to_string(),
        }
    }

    fn url(&self) -> String {
        match self.request.target() {
            "" => "/".to_string(),
            target => target.to_string(),
        }
    }

    fn set_status(&self, code: u16) {
        if let Err(err) = self.reply.status(code) {
            tracing::warn!(status = code, error = %err, "dropping response status");
        }
    }

    fn json(&self, data: &dyn JsonBody) {
        self.default_content_type(JSON_CONTENT_TYPE);
        match data.to_json_vec() {
            Ok(body) => self.reply.send(body),
            Err(err) => {
                tracing::error!(
                    request_id = %self.request.id(),
                    error = %err,
                    "failed to serialize JSON response"
                );
                self.set_status(500);
                self.set_header(CONTENT_TYPE.as_str(), JSON_CONTENT_TYPE);
                self.reply.send(Bytes::from_static(JSON_FAILURE_BODY.as_bytes()));
            }
        }
    }

    fn html(&self, content: &str) {
        self.default_content_type(HTML_CONTENT_TYPE);
        self.reply.send(Bytes::copy_from_slice(content.as_bytes()));
    }

    fn send_raw(&self, body: Bytes) {
        self.reply.send(body);
    }

    fn redirect(&self, target: StatusOrUrl, url: Option<&str>) -> Result<(), AdapterError> {
        let (status, location) = match (target, url) {
            (StatusOrUrl::Url(location), None) => (DEFAULT_REDIRECT_STATUS, location),
            (StatusOrUrl::Status(status), Some(location)) => (status, location.to_string()),
            (StatusOrUrl::Status(status), None) => {
                return Err(AdapterError::InvalidArgument(format!(
                    "redirect status {} requires a url",
                    status
                )));
            }
            (StatusOrUrl::Url(_), Some(_)) => {
                return Err(AdapterError::InvalidArgument(
                    "redirect takes (url) or (status, url)".to_string(),
                ));
            }
        };

        self.reply.redirect(&location, status)?;
        Ok(())
    }

    fn end(&self, data: Option<Bytes>) {
        self.reply.send(data.unwrap_or_default());
    }

    fn is_sent(&self) -> bool {
        self.reply.is_sent()
    }

    fn raw_request(&self) -> &dyn Any {
        let request: &HostRequest = &self.request;
        request
    }

    fn raw_response(&self) -> &dyn Any {
        &self.reply
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::{Method, Request, StatusCode};
    use serde::ser::{Error as _, Serialize, Serializer};
    use serde_json::json;

    struct Cyclic;

    impl Serialize for Cyclic {
        fn serialize<S: Serializer>(&self, _serializer: S) -> Result<S::Ok, S::Error> {
            Err(S::Error::custom("cyclic structure"))
        }
    }

    fn adapter_for(request: Request<Bytes>) -> (HostAdapter, Reply) {
        let reply = Reply::new();
        let adapter = HostAdapter::new(Arc::new(HostRequest::new(request)), reply.clone());
        (adapter, reply)
    }

    fn empty_adapter() -> (HostAdapter, Reply) {
        adapter_for(Request::builder().uri("/").body(Bytes::new()).unwrap())
    }

    // === Request Read Tests ===

    #[test]
    fn test_header_case_insensitive() {
        let (adapter, _) = adapter_for(
            Request::builder()
                .uri("/")
                .header("Content-Type", "application/json")
                .body(Bytes::new())
                .unwrap(),
        );

        assert_eq!(
            adapter.header("content-type"),
            Some(HeaderEntry::One("application/json".to_string()))
        );
        assert_eq!(adapter.header("Content-Type"), adapter.header("content-type"));
    }

    #[test]
    fn test_header_multiple_values() {
        let (adapter, _) = adapter_for(
            Request::builder()
                .uri("/")
                .header("Accept", "text/html")
                .header("accept", "application/json")
                .body(Bytes::new())
                .unwrap(),
        );

        assert_eq!(
            adapter.header("ACCEPT"),
            Some(HeaderEntry::Many(vec![
                "text/html".to_string(),
                "application/json".to_string()
            ]))
        );
    }

    #[test]
    fn test_header_absent() {
        let (adapter, _) = empty_adapter();

        assert_eq!(adapter.header("x-inertia"), None);
    }

    #[test]
    fn test_method_and_url() {
        let (adapter, _) = adapter_for(
            Request::builder()
                .method(Method::PUT)
                .uri("/users/1?tab=profile")
                .body(Bytes::new())
                .unwrap(),
        );

        assert_eq!(adapter.method(), "PUT");
        assert_eq!(adapter.url(), "/users/1?tab=profile");
    }

    #[test]
    fn test_url_defaults_to_root() {
        let (adapter, _) = adapter_for(
            Request::builder()
                .method(Method::CONNECT)
                .uri("example.com:443")
                .body(Bytes::new())
                .unwrap(),
        );

        assert_eq!(adapter.url(), "/");
    }

    // === Response Write Tests ===

    #[test]
    fn test_set_header_and_status() {
        let (adapter, reply) = empty_adapter();
        adapter.set_header("X-Inertia", "true");
        adapter.set_status(409);

        assert_eq!(reply.header_value("x-inertia"), Some("true".to_string()));
        assert_eq!(reply.status_code(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_invalid_writes_are_dropped() {
        let (adapter, reply) = empty_adapter();
        adapter.set_header("bad header", "x");
        adapter.set_status(7);

        assert!(reply.headers().is_empty());
        assert_eq!(reply.status_code(), StatusCode::OK);
    }

    #[test]
    fn test_json_sets_content_type() {
        let (adapter, reply) = empty_adapter();
        adapter.json(&json!({"component": "Users/Index"}));

        assert!(adapter.is_sent());
        assert_eq!(reply.header_value("content-type"), Some("application/json".to_string()));
        assert_eq!(reply.body().as_ref(), br#"{"component":"Users/Index"}"#);
    }

    #[test]
    fn test_json_keeps_existing_content_type() {
        let (adapter, reply) = empty_adapter();
        adapter.set_header("Content-Type", "application/vnd.api+json");
        adapter.json(&json!([]));

        assert_eq!(
            reply.header_value("content-type"),
            Some("application/vnd.api+json".to_string())
        );
    }

    #[test]
    fn test_json_serialization_failure() {
        let (adapter, reply) = empty_adapter();
        adapter.json(&Cyclic);

        assert!(reply.is_sent());
        assert_eq!(reply.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: serde_json::Value = serde_json::from_slice(&reply.body()).unwrap();
        assert_eq!(body, json!({"error": "Failed to serialize JSON"}));
    }

    #[test]
    fn test_json_failure_forces_json_content_type() {
        let (adapter, reply) = empty_adapter();
        adapter.set_header("Content-Type", "text/csv");
        adapter.json(&Cyclic);

        assert_eq!(reply.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(reply.header_value("content-type"), Some("application/json".to_string()));
    }

    #[test]
    fn test_html_and_send() {
        let (adapter, reply) = empty_adapter();
        adapter.send("<div id=\"app\"></div>");

        assert_eq!(reply.header_value("content-type"), Some("text/html".to_string()));
        assert_eq!(reply.body().as_ref(), b"<div id=\"app\"></div>");
    }

    #[test]
    fn test_send_raw_leaves_content_type() {
        let (adapter, reply) = empty_adapter();
        adapter.send_raw(Bytes::from_static(b"\x00\x01"));

        assert!(!reply.has_header("content-type"));
        assert_eq!(reply.body().as_ref(), b"\x00\x01");
    }

    #[test]
    fn test_end_without_payload() {
        let (adapter, reply) = empty_adapter();
        adapter.set_status(409);
        adapter.set_header("X-Inertia-Location", "/dashboard");
        adapter.end(None);

        assert!(reply.is_sent());
        assert!(reply.body().is_empty());
        assert_eq!(reply.status_code(), StatusCode::CONFLICT);
    }

    // === Redirect Tests ===

    #[test]
    fn test_redirect_with_status() {
        let (adapter, reply) = empty_adapter();
        adapter.redirect(StatusOrUrl::Status(301), Some("/new")).unwrap();

        assert_eq!(reply.status_code(), StatusCode::MOVED_PERMANENTLY);
        assert_eq!(reply.header_value("location"), Some("/new".to_string()));
    }

    #[test]
    fn test_redirect_url_only() {
        let (adapter, reply) = empty_adapter();
        adapter.redirect("/new".into(), None).unwrap();

        assert_eq!(reply.status_code(), StatusCode::FOUND);
        assert_eq!(reply.header_value("location"), Some("/new".to_string()));
    }

    #[test]
    fn test_redirect_helpers() {
        let (adapter, reply) = empty_adapter();
        adapter.redirect_with(303, "/login").unwrap();

        assert_eq!(reply.status_code(), StatusCode::SEE_OTHER);
        assert_eq!(reply.header_value("location"), Some("/login".to_string()));

        let (adapter, reply) = empty_adapter();
        adapter.redirect_to("/home").unwrap();
        assert_eq!(reply.status_code(), StatusCode::FOUND);
    }

    #[test]
    fn test_redirect_status_without_url() {
        let (adapter, reply) = empty_adapter();
        let result = adapter.redirect(StatusOrUrl::Status(301), None);

        assert!(matches!(result, Err(AdapterError::InvalidArgument(_))));
        assert!(!reply.is_sent());
    }

    #[test]
    fn test_redirect_url_with_extra_url() {
        let (adapter, _) = empty_adapter();

        assert!(matches!(
            adapter.redirect("/a".into(), Some("/b")),
            Err(AdapterError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_redirect_invalid_status() {
        let (adapter, _) = empty_adapter();

        assert!(matches!(
            adapter.redirect_with(42, "/x"),
            Err(AdapterError::Host(_))
        ));
    }

    // === Escape Hatch Tests ===

    #[test]
    fn test_raw_escape_hatches() {
        let (adapter, _) = empty_adapter();

        let request = adapter.raw_request().downcast_ref::<HostRequest>();
        assert_eq!(request.map(|r| r.target()), Some("/"));
        assert!(adapter.raw_response().downcast_ref::<Reply>().is_some());
    }
}
