//! Typed operations against the MagicStream backend.

use tracing::{debug, info, instrument, warn};

use magicstream_core::error::{AuthError, InvalidInputError};
use magicstream_core::{
    AccessToken, Credentials, Genre, Method, Movie, NewUser, RefreshToken, Result, ReviewUpdate,
    Session, SessionContext, Transport,
};

use crate::authed::AuthedClient;
use crate::client::{ApiClient, to_body};
use crate::config::ClientConfig;
use crate::endpoints::{
    ACCESS_TOKEN_COOKIE, GENRES, LOGIN, LOGOUT, LoginRequest, LoginResponse, LogoutRequest, MOVIE,
    MOVIES, RECOMMENDED_MOVIES, REFRESH_TOKEN_COOKIE, REGISTER, ReviewRequest, UPDATE_REVIEW,
    non_empty,
};
use crate::transport::HttpTransport;

/// The MagicStream backend, seen through one shared session context.
///
/// Public endpoints go through an [`ApiClient`]; protected endpoints go
/// through an [`AuthedClient`] over the same transport, so both see the same
/// cookies.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use magicstream_core::{Credentials, MemorySessionStore, SessionContext};
/// use magicstream_http::{ClientConfig, MovieApi};
///
/// # async fn example() -> Result<(), magicstream_core::Error> {
/// let context = SessionContext::new(Arc::new(MemorySessionStore::new()));
/// context.initialize().await;
///
/// let api = MovieApi::connect(&ClientConfig::from_env()?, context)?;
/// api.login(&Credentials::new("ana@example.com", "secret")).await?;
///
/// for movie in api.recommended().await? {
///     println!("{}", movie.title);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct MovieApi<T> {
    public: ApiClient<T>,
    authed: AuthedClient<T>,
}

impl<T> Clone for MovieApi<T> {
    fn clone(&self) -> Self {
        Self {
            public: self.public.clone(),
            authed: self.authed.clone(),
        }
    }
}

impl MovieApi<HttpTransport> {
    /// Connect to the backend described by `config`.
    pub fn connect(config: &ClientConfig, context: SessionContext) -> Result<Self> {
        Ok(Self::new(HttpTransport::new(config)?, context))
    }
}

impl<T: Transport> MovieApi<T> {
    /// Create the API over `transport`.
    pub fn new(transport: T, context: SessionContext) -> Self {
        let public = ApiClient::new(transport);
        let authed = AuthedClient::new(public.clone(), context);
        Self { public, authed }
    }

    /// Returns the session context.
    pub fn context(&self) -> &SessionContext {
        self.authed.context()
    }

    /// Returns the client used for public endpoints.
    pub fn public(&self) -> &ApiClient<T> {
        &self.public
    }

    /// Returns the client used for protected endpoints.
    pub fn authed(&self) -> &AuthedClient<T> {
        &self.authed
    }

    /// List every movie.
    #[instrument(skip(self))]
    pub async fn movies(&self) -> Result<Vec<Movie>> {
        let movies: Vec<Movie> = self.public.get(MOVIES).await?;
        debug!(count = movies.len(), "Fetched movies");
        Ok(movies)
    }

    /// List every genre.
    #[instrument(skip(self))]
    pub async fn genres(&self) -> Result<Vec<Genre>> {
        self.public.get(GENRES).await
    }

    /// Movies recommended for the signed-in user.
    #[instrument(skip(self))]
    pub async fn recommended(&self) -> Result<Vec<Movie>> {
        let movies: Vec<Movie> = self.authed.get(RECOMMENDED_MOVIES).await?;
        debug!(count = movies.len(), "Fetched recommended movies");
        Ok(movies)
    }

    /// Fetch one movie by IMDB id.
    #[instrument(skip(self))]
    pub async fn movie(&self, imdb_id: &str) -> Result<Movie> {
        let path = format!("{}/{}", MOVIE, path_segment(imdb_id)?);
        self.authed.get(&path).await
    }

    /// Set the admin review for a movie. Requires the `ADMIN` role.
    #[instrument(skip(self, review))]
    pub async fn update_review(&self, imdb_id: &str, review: &str) -> Result<ReviewUpdate> {
        let path = format!("{}/{}", UPDATE_REVIEW, path_segment(imdb_id)?);
        self.authed
            .patch(
                &path,
                &ReviewRequest {
                    admin_review: review,
                },
            )
            .await
    }

    /// Create a new account.
    #[instrument(skip(self, user), fields(email = %user.email))]
    pub async fn register(&self, user: &NewUser) -> Result<()> {
        self.public.post_no_response(REGISTER, user).await?;
        info!("Account registered");
        Ok(())
    }

    /// Sign in and make the new session current.
    ///
    /// The access token is taken from the response body when present and
    /// from the `access_token` cookie otherwise.
    #[instrument(skip(self, credentials), fields(email = %credentials.email()))]
    pub async fn login(&self, credentials: &Credentials) -> Result<Session> {
        info!("Signing in");

        let request = LoginRequest {
            email: credentials.email(),
            password: credentials.password(),
        };
        let response = self
            .public
            .request(Method::Post, LOGIN, Some(to_body(&request)?))
            .await?;

        let payload: LoginResponse = response.json()?;
        let access = non_empty(payload.token)
            .or_else(|| response.cookie(ACCESS_TOKEN_COOKIE).map(str::to_string))
            .ok_or(AuthError::MissingAccessToken)?;
        let refresh = non_empty(payload.refresh_token)
            .or_else(|| response.cookie(REFRESH_TOKEN_COOKIE).map(str::to_string));

        let mut session = Session::new(AccessToken::new(access), payload.user)?;
        if let Some(refresh) = refresh {
            session = session.with_refresh_token(RefreshToken::new(refresh));
        }

        self.context().set_session(Some(session.clone())).await;
        debug!(user_id = %session.user().user_id, "Signed in");
        Ok(session)
    }

    /// Sign out.
    ///
    /// The local session is cleared whatever the backend answers; a backend
    /// failure is still returned to the caller.
    #[instrument(skip(self))]
    pub async fn logout(&self) -> Result<()> {
        let Some(session) = self.context().session() else {
            debug!("No session to sign out");
            self.context().set_session(None).await;
            return Ok(());
        };

        let result = self
            .public
            .post_no_response(
                LOGOUT,
                &LogoutRequest {
                    user_id: &session.user().user_id,
                },
            )
            .await;

        self.context().set_session(None).await;

        match result {
            Ok(()) => {
                info!("Signed out");
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Backend logout failed; local session cleared");
                Err(e)
            }
        }
    }

    /// Refresh the current session now.
    pub async fn refresh(&self) -> Result<Session> {
        self.authed.refresh().await
    }
}

/// Check that `id` can be used as a single path segment.
fn path_segment(id: &str) -> Result<&str> {
    let id = id.trim();
    if id.is_empty()
        || !id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.')
        || id == "."
        || id == ".."
    {
        return Err(InvalidInputError::Path {
            value: id.to_string(),
            reason: "movie id must be a single path segment".to_string(),
        }
        .into());
    }
    Ok(id)
}
