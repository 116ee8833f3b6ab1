//! Backend endpoint paths and request/response bodies.

use serde::{Deserialize, Serialize};

use magicstream_core::UserProfile;

// ============================================================================
// Endpoint Paths
// ============================================================================

/// Public movie listing.
pub const MOVIES: &str = "/movies";

/// Public genre listing.
pub const GENRES: &str = "/genres";

/// Movies recommended for the signed-in user.
pub const RECOMMENDED_MOVIES: &str = "/recommendedmovies";

/// Single movie by IMDB id (append `/{imdb_id}`).
pub const MOVIE: &str = "/movie";

/// Admin review update (append `/{imdb_id}`).
pub const UPDATE_REVIEW: &str = "/updatereview";

/// Account registration.
pub const REGISTER: &str = "/register";

/// Login.
pub const LOGIN: &str = "/login";

/// Logout.
pub const LOGOUT: &str = "/logout";

/// Token refresh.
pub const REFRESH: &str = "/refresh";

/// Cookie carrying the access token.
pub const ACCESS_TOKEN_COOKIE: &str = "access_token";

/// Cookie carrying the refresh token.
pub const REFRESH_TOKEN_COOKIE: &str = "refresh_token";

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for login.
#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// Response from login.
///
/// The backend may return the tokens in the body, as cookies, or both.
#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    #[serde(default, alias = "access_token", alias = "accessToken")]
    pub token: Option<String>,
    #[serde(default, alias = "refreshToken")]
    pub refresh_token: Option<String>,
    #[serde(flatten)]
    pub user: UserProfile,
}

/// Request body for logout.
#[derive(Debug, Serialize)]
pub struct LogoutRequest<'a> {
    pub user_id: &'a str,
}

/// Request body for refresh.
#[derive(Debug, Serialize)]
pub struct RefreshRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<&'a str>,
}

/// Response from refresh.
#[derive(Debug, Default, Deserialize)]
pub struct RefreshResponse {
    #[serde(default, alias = "access_token", alias = "accessToken")]
    pub token: Option<String>,
    #[serde(default, alias = "refreshToken")]
    pub refresh_token: Option<String>,
}

/// Request body for an admin review update.
#[derive(Debug, Serialize)]
pub struct ReviewRequest<'a> {
    pub admin_review: &'a str,
}

/// Error body returned by the backend.
#[derive(Debug, Deserialize)]
pub struct ErrorResponse {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Returns `token` if it carries a value.
pub(crate) fn non_empty(token: Option<String>) -> Option<String> {
    token.filter(|t| !t.trim().is_empty())
}
