//! reqwest-backed transport.

use std::fmt;
use std::sync::Arc;
use std::time::SystemTime;

use async_trait::async_trait;
use reqwest::cookie::Jar;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use tracing::{debug, instrument, trace};

use magicstream_core::error::{Error, TransportError};
use magicstream_core::{ApiRequest, ApiResponse, ApiUrl, Method, Result, Transport};

use crate::config::ClientConfig;

/// Map a reqwest failure onto the transport error taxonomy.
pub(crate) fn transport_error(err: reqwest::Error) -> Error {
    let message = err.to_string();
    let err = if err.is_timeout() {
        TransportError::Timeout { message }
    } else if err.is_connect() {
        TransportError::Connection { message }
    } else if err.is_decode() {
        TransportError::Decode { message }
    } else {
        TransportError::Http { message }
    };
    Error::Transport(err)
}

fn reqwest_method(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Post => reqwest::Method::POST,
        Method::Put => reqwest::Method::PUT,
        Method::Patch => reqwest::Method::PATCH,
        Method::Delete => reqwest::Method::DELETE,
    }
}

/// Cookies a response set and did not immediately expire.
fn live_cookies(response: &reqwest::Response) -> Vec<(String, String)> {
    let now = SystemTime::now();
    response
        .cookies()
        .filter(|c| !c.value().trim().is_empty())
        .filter(|c| c.max_age().is_none_or(|age| !age.is_zero()))
        .filter(|c| c.expires().is_none_or(|at| at > now))
        .map(|c| (c.name().to_string(), c.value().to_string()))
        .collect()
}

/// HTTP transport with the backend's fixed configuration: base URL, JSON
/// content type, and a cookie jar.
///
/// The jar keeps cookies the backend sets. Cookies named on a request are
/// written into the jar first, so a session restored from disk presents the
/// same credential cookies a fresh login would.
#[derive(Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: ApiUrl,
    jar: Arc<Jar>,
}

impl HttpTransport {
    /// Build a transport from `config`.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let jar = Arc::new(Jar::default());
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .default_headers(headers)
            .cookie_provider(Arc::clone(&jar))
            .timeout(config.timeout)
            .build()
            .map_err(transport_error)?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            jar,
        })
    }

    /// Returns the base URL this transport targets.
    pub fn base_url(&self) -> &ApiUrl {
        &self.base_url
    }
}

#[async_trait]
impl Transport for HttpTransport {
    #[instrument(skip(self, request), fields(method = %request.method, path = %request.path))]
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
        let url = self.base_url.endpoint(&request.path)?;
        debug!(
            authed = request.bearer.is_some(),
            cookies = request.cookies.len(),
            "HTTP request"
        );

        for (name, value) in &request.cookies {
            self.jar
                .add_cookie_str(&format!("{name}={value}; Path=/"), self.base_url.as_url());
        }

        let mut builder = self.client.request(reqwest_method(request.method), &url);
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }
        if let Some(token) = &request.bearer {
            builder = builder.bearer_auth(token.as_str());
        }

        let response = builder.send().await.map_err(transport_error)?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let cookies = live_cookies(&response);
        let body = response.bytes().await.map_err(transport_error)?.to_vec();

        trace!(status, bytes = body.len(), "HTTP response");
        Ok(ApiResponse {
            status,
            headers,
            cookies,
            body,
        })
    }
}

impl fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpTransport")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn local(server: &MockServer) -> HttpTransport {
        let url = ApiUrl::new(format!("http://127.0.0.1:{}", server.address().port())).unwrap();
        HttpTransport::new(&ClientConfig::new(url)).unwrap()
    }

    #[test]
    fn transport_creation() {
        let config = ClientConfig::new(ApiUrl::new("http://localhost:8080").unwrap());
        let transport = HttpTransport::new(&config).unwrap();
        assert_eq!(transport.base_url().as_str(), "http://localhost:8080/");
    }

    #[tokio::test]
    async fn unreachable_backend_is_transport_error() {
        // Port 9 (discard) is closed on test hosts.
        let config = ClientConfig::new(ApiUrl::new("http://127.0.0.1:9").unwrap())
            .with_timeout(std::time::Duration::from_secs(2));
        let transport = HttpTransport::new(&config).unwrap();

        let result = transport
            .send(ApiRequest::new(Method::Get, "/movies"))
            .await;
        assert!(matches!(result, Err(Error::Transport(_))));
    }

    #[tokio::test]
    async fn expired_cookies_are_not_reported() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/refresh"))
            .respond_with(
                ResponseTemplate::new(200)
                    .append_header("set-cookie", "access_token=a9; Path=/; HttpOnly")
                    .append_header("set-cookie", "refresh_token=; Path=/; Max-Age=-1")
                    .append_header(
                        "set-cookie",
                        "theme=dark; Path=/; Expires=Thu, 01 Jan 1970 00:00:00 GMT",
                    ),
            )
            .mount(&server)
            .await;

        let response = local(&server)
            .await
            .send(ApiRequest::new(Method::Post, "/refresh"))
            .await
            .unwrap();
        assert_eq!(response.cookie("access_token"), Some("a9"));
        assert_eq!(response.cookie("refresh_token"), None);
        assert_eq!(response.cookie("theme"), None);
    }

    #[tokio::test]
    async fn request_cookies_are_sent_and_kept() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/recommendedmovies"))
            .and(header("cookie", "access_token=t1"))
            .respond_with(ResponseTemplate::new(200))
            .expect(2)
            .mount(&server)
            .await;

        let transport = local(&server).await;
        let seeded =
            ApiRequest::new(Method::Get, "/recommendedmovies").with_cookie("access_token", "t1");
        assert_eq!(transport.send(seeded).await.unwrap().status, 200);

        let plain = ApiRequest::new(Method::Get, "/recommendedmovies");
        assert_eq!(transport.send(plain).await.unwrap().status, 200);
    }

    #[test]
    fn debug_output_omits_cookies() {
        let config = ClientConfig::new(ApiUrl::new("http://localhost:8080").unwrap());
        let transport = HttpTransport::new(&config).unwrap();
        transport
            .jar
            .add_cookie_str("access_token=t1-secret; Path=/", transport.base_url.as_url());
        assert!(!format!("{transport:?}").contains("t1-secret"));
    }
}
