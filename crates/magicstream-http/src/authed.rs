//! Authenticated API client with single refresh-and-retry.

use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use magicstream_core::error::AuthError;
use magicstream_core::{
    AccessToken, ApiRequest, ApiResponse, Method, RefreshToken, Result, Session, SessionContext,
    Transport,
};

use crate::client::{ApiClient, to_body};
use crate::endpoints::{
    ACCESS_TOKEN_COOKIE, REFRESH, REFRESH_TOKEN_COOKIE, RefreshRequest, RefreshResponse, non_empty,
};

/// Client for endpoints that require the signed-in user's credential.
///
/// Every request carries the context's current access token twice: as a
/// bearer header and as the `access_token` cookie, next to the
/// `refresh_token` cookie. When the backend answers 401, the client refreshes
/// the session once and reissues the request once with the new token. A
/// failed refresh or a second 401 is returned to the caller and the session
/// is left as it was.
///
/// Concurrent requests that fail together share one refresh: whoever takes
/// the refresh lock second sees the token has already changed and retries
/// with it directly. A refresh that finishes after the session was signed
/// out or replaced is discarded.
#[derive(Debug)]
pub struct AuthedClient<T> {
    api: ApiClient<T>,
    context: SessionContext,
    refresh_lock: Arc<Mutex<()>>,
}

impl<T> Clone for AuthedClient<T> {
    fn clone(&self) -> Self {
        Self {
            api: self.api.clone(),
            context: self.context.clone(),
            refresh_lock: Arc::clone(&self.refresh_lock),
        }
    }
}

impl<T: Transport> AuthedClient<T> {
    /// Wrap `api` with credentials from `context`.
    pub fn new(api: ApiClient<T>, context: SessionContext) -> Self {
        Self {
            api,
            context,
            refresh_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Returns the session context this client reads credentials from.
    pub fn context(&self) -> &SessionContext {
        &self.context
    }

    /// Send a request with the current credential, refreshing once on 401.
    #[instrument(skip(self, request), fields(method = %request.method, path = %request.path))]
    pub async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
        let session = self.context.session();
        let response = self
            .api
            .send_raw(with_credentials(request.clone(), session.as_ref()))
            .await?;

        if response.status != 401 {
            return ApiClient::<T>::check(response);
        }

        let Some(rejected) = session else {
            debug!("Unauthorized without a session; not refreshing");
            return ApiClient::<T>::check(response);
        };

        info!("Access token rejected, refreshing session");
        let fresh = self
            .refresh_after(rejected.access_token())
            .await
            .inspect_err(|e| {
                warn!(error = %e, "Session refresh failed");
            })?;

        debug!("Retrying request with refreshed token");
        let retried = self
            .api
            .send_raw(with_credentials(request, Some(&fresh)))
            .await?;
        ApiClient::<T>::check(retried)
    }

    /// Issue `method path` with an optional JSON body.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<ApiResponse> {
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

    /// Refresh the current session unconditionally.
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> Result<Session> {
        let _guard = self.refresh_lock.lock().await;
        let current = self.context.session().ok_or(AuthError::NotAuthenticated)?;
        let next = self.refresh_session(&current).await?;
        self.commit(&current, next).await
    }

    /// Obtain a session newer than the one holding `rejected`, refreshing
    /// only if no one else already has.
    async fn refresh_after(&self, rejected: &AccessToken) -> Result<Session> {
        let _guard = self.refresh_lock.lock().await;
        let current = self.context.session().ok_or(AuthError::NotAuthenticated)?;

        if current.access_token() != rejected {
            debug!("Session already refreshed by a concurrent request");
            return Ok(current);
        }

        let next = self.refresh_session(&current).await?;
        self.commit(&current, next).await
    }

    /// Publish `next` unless the session moved on from `current` while the
    /// refresh was in flight.
    async fn commit(&self, current: &Session, next: Session) -> Result<Session> {
        if self
            .context
            .replace_if_current(current.access_token(), next.clone())
            .await
        {
            Ok(next)
        } else {
            warn!("Session changed during refresh; discarding refreshed credential");
            Err(AuthError::SessionChanged.into())
        }
    }

    /// Call the refresh endpoint and build the replacement session.
    ///
    /// Any failure, including an unreachable endpoint, is reported as a
    /// rejected refresh.
    async fn refresh_session(&self, current: &Session) -> Result<Session> {
        let body = to_body(&RefreshRequest {
            refresh_token: current.refresh_token().map(RefreshToken::as_str),
        })?;

        let request = with_cookies(ApiRequest::new(Method::Post, REFRESH), current);
        let response = self
            .api
            .send(request.with_body(body))
            .await
            .map_err(|e| AuthError::RefreshRejected {
                reason: e.to_string(),
            })?;

        let payload: RefreshResponse = response.json().unwrap_or_default();
        let access = non_empty(payload.token)
            .or_else(|| response.cookie(ACCESS_TOKEN_COOKIE).map(str::to_string))
            .ok_or(AuthError::MissingAccessToken)?;
        let refresh = non_empty(payload.refresh_token)
            .or_else(|| response.cookie(REFRESH_TOKEN_COOKIE).map(str::to_string));

        let next = current.refreshed(AccessToken::new(access), refresh.map(RefreshToken::new))?;
        debug!("Session refreshed");
        Ok(next)
    }
}

/// Attach `session`'s credentials, or none when signed out.
fn with_credentials(mut request: ApiRequest, session: Option<&Session>) -> ApiRequest {
    request.bearer = session.map(|s| s.access_token().clone());
    match session {
        Some(session) => with_cookies(request, session),
        None => request,
    }
}

/// Present `session`'s tokens as the backend's credential cookies.
fn with_cookies(request: ApiRequest, session: &Session) -> ApiRequest {
    let request = request.with_cookie(ACCESS_TOKEN_COOKIE, session.access_token().as_str());
    match session.refresh_token() {
        Some(refresh) => request.with_cookie(REFRESH_TOKEN_COOKIE, refresh.as_str()),
        None => request,
    }
}
