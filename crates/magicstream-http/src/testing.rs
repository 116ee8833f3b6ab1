//! Scripted transport for unit tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use magicstream_core::error::TransportError;
use magicstream_core::{ApiRequest, ApiResponse, Result, Transport};

type Handler = Arc<dyn Fn(&ApiRequest) -> Result<ApiResponse> + Send + Sync>;

/// A [`Transport`] that answers from per-path scripts and records every
/// request it sees.
///
/// Each path holds a queue of handlers; the last one repeats once the
/// others are used up. Unscripted paths answer 404.
#[derive(Clone, Default)]
pub(crate) struct ScriptedTransport {
    inner: Arc<Inner>,
}

#[derive(Default)]
struct Inner {
    routes: Mutex<HashMap<String, Vec<Handler>>>,
    requests: Mutex<Vec<ApiRequest>>,
    delay: Mutex<Option<Duration>>,
}

impl ScriptedTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Queue a fixed response for `path`.
    pub(crate) fn respond(self, path: &str, response: ApiResponse) -> Self {
        self.handle(path, move |_| Ok(response.clone()))
    }

    /// Queue a connection failure for `path`.
    pub(crate) fn unreachable(self, path: &str) -> Self {
        self.handle(path, |_| {
            Err(TransportError::Connection {
                message: "connection refused".to_string(),
            }
            .into())
        })
    }

    /// Queue a handler computing the response for `path`.
    pub(crate) fn handle(
        self,
        path: &str,
        handler: impl Fn(&ApiRequest) -> Result<ApiResponse> + Send + Sync + 'static,
    ) -> Self {
        self.inner
            .routes
            .lock()
            .unwrap()
            .entry(path.to_string())
            .or_default()
            .push(Arc::new(handler));
        self
    }

    /// Sleep before answering, so concurrent requests interleave.
    pub(crate) fn with_delay(self, delay: Duration) -> Self {
        *self.inner.delay.lock().unwrap() = Some(delay);
        self
    }

    /// Every request seen so far.
    pub(crate) fn requests(&self) -> Vec<ApiRequest> {
        self.inner.requests.lock().unwrap().clone()
    }

    /// Number of requests seen for `path`.
    pub(crate) fn count(&self, path: &str) -> usize {
        self.requests().iter().filter(|r| r.path == path).count()
    }

    /// Bearer tokens sent to `path`, in order.
    pub(crate) fn bearers(&self, path: &str) -> Vec<Option<String>> {
        self.requests()
            .iter()
            .filter(|r| r.path == path)
            .map(|r| r.bearer.as_ref().map(|t| t.as_str().to_string()))
            .collect()
    }

    fn next_handler(&self, path: &str) -> Option<Handler> {
        let mut routes = self.inner.routes.lock().unwrap();
        let queue = routes.get_mut(path)?;
        if queue.len() > 1 {
            Some(queue.remove(0))
        } else {
            queue.first().cloned()
        }
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
        self.inner.requests.lock().unwrap().push(request.clone());

        let delay = *self.inner.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        match self.next_handler(&request.path) {
            Some(handler) => handler(&request),
            None => Ok(ApiResponse::new(404, "")),
        }
    }
}

impl std::fmt::Debug for ScriptedTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScriptedTransport")
            .field("requests", &self.inner.requests.lock().unwrap().len())
            .finish()
    }
}
