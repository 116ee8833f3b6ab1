//! Unauthenticated API client.

use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, instrument, trace};

use magicstream_core::error::{Error, InvalidInputError, ProtocolError};
use magicstream_core::{ApiRequest, ApiResponse, Method, Result, Transport};

use crate::endpoints::ErrorResponse;

/// Serialize a request body.
pub(crate) fn to_body<B: Serialize>(body: &B) -> Result<Value> {
    serde_json::to_value(body).map_err(|e| {
        InvalidInputError::Other {
            message: format!("request body is not valid JSON: {}", e),
        }
        .into()
    })
}

/// Parse a non-success response into a protocol error.
pub(crate) fn protocol_error(response: &ApiResponse) -> ProtocolError {
    match response.json::<ErrorResponse>() {
        Ok(body) => ProtocolError::new(response.status, body.error, body.details.or(body.message)),
        Err(_) => ProtocolError::new(response.status, None, None),
    }
}

/// Client for public endpoints.
///
/// Requests go out exactly as given: no credential is attached and no retry
/// is attempted. Any non-2xx status becomes [`Error::Protocol`].
#[derive(Debug)]
pub struct ApiClient<T> {
    transport: Arc<T>,
}

impl<T> Clone for ApiClient<T> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
        }
    }
}

impl<T: Transport> ApiClient<T> {
    /// Create a client over `transport`.
    pub fn new(transport: T) -> Self {
        Self::from_shared(Arc::new(transport))
    }

    /// Create a client over a shared transport.
    pub fn from_shared(transport: Arc<T>) -> Self {
        Self { transport }
    }

    /// Returns the underlying transport.
    pub fn transport(&self) -> &Arc<T> {
        &self.transport
    }

    /// Send a request and return the raw response, whatever its status.
    pub(crate) async fn send_raw(&self, request: ApiRequest) -> Result<ApiResponse> {
        self.transport.send(request).await
    }

    /// Send a request, failing on non-success statuses.
    pub async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
        let response = self.send_raw(request).await?;
        Self::check(response)
    }

    /// Issue `method path` with an optional JSON body.
    #[instrument(skip(self, body))]
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<ApiResponse> {
        debug!("API request");
        let mut request = ApiRequest::new(method, path);
        request.body = body;
        self.send(request).await
    }

    /// GET `path` and decode the JSON response.
    pub async fn get<R: DeserializeOwned>(&self, path: &str) -> Result<R> {
        self.request(Method::Get, path, None).await?.json()
    }

    /// POST a JSON body to `path` and decode the JSON response.
    pub async fn post<B, R>(&self, path: &str, body: &B) -> Result<R>
    where
        B: Serialize,
        R: DeserializeOwned,
    {
        self.request(Method::Post, path, Some(to_body(body)?))
            .await?
            .json()
    }

    /// PATCH a JSON body to `path` and decode the JSON response.
    pub async fn patch<B, R>(&self, path: &str, body: &B) -> Result<R>
    where
        B: Serialize,
        R: DeserializeOwned,
    {
        self.request(Method::Patch, path, Some(to_body(body)?))
            .await?
            .json()
    }

    /// POST a JSON body to `path`, ignoring the response body.
    pub async fn post_no_response<B: Serialize>(&self, path: &str, body: &B) -> Result<()> {
        self.request(Method::Post, path, Some(to_body(body)?))
            .await
            .map(|_| ())
    }

    /// Turn a non-success response into an error.
    pub(crate) fn check(response: ApiResponse) -> Result<ApiResponse> {
        trace!(status = response.status, "API response");
        if response.is_success() {
            Ok(response)
        } else {
            Err(Error::Protocol(protocol_error(&response)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedTransport;
    use serde_json::json;

    #[tokio::test]
    async fn success_passes_through() {
        let transport = ScriptedTransport::new()
            .respond("/movies", ApiResponse::json_body(200, &json!([])));
        let client = ApiClient::new(transport);

        let movies: Vec<Value> = client.get("/movies").await.unwrap();
        assert!(movies.is_empty());
    }

    #[tokio::test]
    async fn error_body_becomes_protocol_error() {
        let transport = ScriptedTransport::new().respond(
            "/register",
            ApiResponse::json_body(
                400,
                &json!({"error": "Validation failed", "details": "Email is required"}),
            ),
        );
        let client = ApiClient::new(transport.clone());

        let err = client
            .post_no_response("/register", &json!({}))
            .await
            .unwrap_err();
        match err {
            Error::Protocol(e) => {
                assert!(e.is_validation_error());
                assert_eq!(e.error.as_deref(), Some("Validation failed"));
                assert_eq!(e.message.as_deref(), Some("Email is required"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(transport.count("/register"), 1);
    }

    #[tokio::test]
    async fn never_attaches_credentials_or_retries() {
        let transport = ScriptedTransport::new().respond(
            "/movies",
            ApiResponse::json_body(401, &json!({"error": "No token provided"})),
        );
        let client = ApiClient::new(transport.clone());

        let err = client.get::<Value>("/movies").await.unwrap_err();
        assert!(err.is_auth_error());
        assert_eq!(transport.count("/movies"), 1);
        assert!(transport.requests()[0].bearer.is_none());
    }
}
