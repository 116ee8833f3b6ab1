//! HTTP transport trait.
//!
//! A [`Transport`] performs exactly one request/response exchange. Retry and
//! credential policy live in the clients layered on top of it, so they can be
//! exercised against scripted transports without a network.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::TransportError;
use crate::{AccessToken, Result};

/// HTTP method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    /// Returns the method name as sent on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A request addressed relative to the API base URL.
#[derive(Clone)]
pub struct ApiRequest {
    pub method: Method,
    /// Absolute path such as `/movies`.
    pub path: String,
    /// JSON body, if any.
    pub body: Option<Value>,
    /// Bearer credential to attach, if any.
    pub bearer: Option<AccessToken>,
    /// Cookies to present alongside any the transport already holds, as
    /// name/value pairs. A cookie named here replaces a held one.
    pub cookies: Vec<(String, String)>,
}

impl ApiRequest {
    /// Create a request without a body or credential.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: None,
            bearer: None,
            cookies: Vec::new(),
        }
    }

    /// Attach a JSON body.
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Attach a bearer credential.
    pub fn with_bearer(mut self, token: AccessToken) -> Self {
        self.bearer = Some(token);
        self
    }

    /// Present a cookie, replacing any earlier one with the same name.
    pub fn with_cookie(mut self, name: &str, value: impl Into<String>) -> Self {
        self.cookies.retain(|(n, _)| n != name);
        self.cookies.push((name.to_string(), value.into()));
        self
    }

    /// Returns the value of a cookie this request presents.
    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.cookies
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }
}

// Cookie values are credentials; only their names are printed.
impl fmt::Debug for ApiRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cookies: Vec<&str> = self.cookies.iter().map(|(n, _)| n.as_str()).collect();
        f.debug_struct("ApiRequest")
            .field("method", &self.method)
            .field("path", &self.path)
            .field("body", &self.body)
            .field("bearer", &self.bearer)
            .field("cookies", &cookies)
            .finish()
    }
}

/// A raw response: status, headers, cookies and body bytes.
#[derive(Debug, Clone, Default)]
pub struct ApiResponse {
    pub status: u16,
    /// Header pairs with lowercase names, in arrival order.
    pub headers: Vec<(String, String)>,
    /// Cookies this response set, as parsed by the transport. Cookies the
    /// response expired or blanked are left out.
    pub cookies: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl ApiResponse {
    /// Create a response with a status and body.
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            cookies: Vec::new(),
            body: body.into(),
        }
    }

    /// Create a response with a JSON body.
    pub fn json_body(status: u16, body: &Value) -> Self {
        Self::new(status, body.to_string()).with_header("content-type", "application/json")
    }

    /// Append a header.
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.push((name.to_ascii_lowercase(), value.into()));
        self
    }

    /// Record a cookie set by this response.
    pub fn with_cookie(mut self, name: &str, value: impl Into<String>) -> Self {
        self.cookies.push((name.to_string(), value.into()));
        self
    }

    /// Returns true for 2xx statuses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Returns the first value of a header.
    pub fn header(&self, name: &str) -> Option<&str> {
        let name = name.to_ascii_lowercase();
        self.headers
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Returns the value of a cookie set by this response. When the
    /// response sets the same name twice the last value wins.
    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.cookies
            .iter()
            .rev()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Decode the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_slice(&self.body).map_err(|e| {
            TransportError::Decode {
                message: e.to_string(),
            }
            .into()
        })
    }

    /// Returns the body as text, replacing invalid UTF-8.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// One HTTP exchange against the backend.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send the request and return the response, whatever its status.
    ///
    /// Errors are reserved for failures to complete the exchange
    /// (connection refused, timeout).
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
        (**self).send(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn response_cookie_lookup_takes_last_value() {
        let response = ApiResponse::new(200, "")
            .with_cookie("refresh_token", "r9")
            .with_cookie("access_token", "a8")
            .with_cookie("access_token", "a9");

        assert_eq!(response.cookie("access_token"), Some("a9"));
        assert_eq!(response.cookie("refresh_token"), Some("r9"));
        assert_eq!(response.cookie("session"), None);
    }

    #[test]
    fn request_cookie_replaces_same_name() {
        let request = ApiRequest::new(Method::Get, "/movies")
            .with_cookie("access_token", "t1")
            .with_cookie("access_token", "t2");
        assert_eq!(request.cookies.len(), 1);
        assert_eq!(request.cookie("access_token"), Some("t2"));
    }

    #[test]
    fn request_debug_hides_cookie_values() {
        let request =
            ApiRequest::new(Method::Get, "/movies").with_cookie("refresh_token", "r1-secret");
        let printed = format!("{request:?}");
        assert!(printed.contains("refresh_token"));
        assert!(!printed.contains("r1-secret"));
    }

    #[test]
    fn decode_failure_is_transport_error() {
        let response = ApiResponse::new(200, "not json");
        let result: Result<Value> = response.json();
        assert!(matches!(
            result,
            Err(crate::Error::Transport(TransportError::Decode { .. }))
        ));
    }

    #[test]
    fn json_body_sets_content_type() {
        let response = ApiResponse::json_body(200, &json!({"ok": true}));
        assert_eq!(response.header("Content-Type"), Some("application/json"));
        assert!(response.is_success());
    }
}
