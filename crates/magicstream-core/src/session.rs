//! The authenticated session record.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Error, InvalidInputError};
use crate::tokens::{AccessToken, RefreshToken};
use crate::types::{Genre, null_as_empty};

/// Display attributes of the signed-in user.
///
/// Fields the client does not know about are kept in `extra` and written
/// back unchanged when the session is persisted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserProfile {
    pub user_id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub favourite_genres: Vec<Genre>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl UserProfile {
    /// Returns "First Last", or whichever part is present.
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }

    /// Returns true if the user holds the `ADMIN` role.
    pub fn is_admin(&self) -> bool {
        self.role.eq_ignore_ascii_case("ADMIN")
    }
}

/// An authenticated principal: an access credential plus the user's profile.
///
/// A `Session` always holds a non-empty access token; "no session" is
/// expressed as `Option<Session>` rather than a half-filled value.
///
/// # Example
///
/// ```
/// use magicstream_core::Session;
///
/// let session = Session::from_json(r#"{"accessToken":"t1","first_name":"Ana"}"#).unwrap();
/// assert_eq!(session.user().first_name, "Ana");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "SessionRecord", into = "SessionRecord")]
pub struct Session {
    access_token: AccessToken,
    refresh_token: Option<RefreshToken>,
    user: UserProfile,
}

/// Serialized form of a [`Session`].
#[derive(Serialize, Deserialize)]
struct SessionRecord {
    #[serde(rename = "accessToken", alias = "token", alias = "access_token")]
    access_token: AccessToken,
    #[serde(
        rename = "refreshToken",
        alias = "refresh_token",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    refresh_token: Option<RefreshToken>,
    #[serde(flatten)]
    user: UserProfile,
}

impl TryFrom<SessionRecord> for Session {
    type Error = Error;

    fn try_from(record: SessionRecord) -> Result<Self, Self::Error> {
        let mut session = Session::new(record.access_token, record.user)?;
        session.refresh_token = record.refresh_token.filter(|t| !t.is_empty());
        Ok(session)
    }
}

impl From<Session> for SessionRecord {
    fn from(session: Session) -> Self {
        Self {
            access_token: session.access_token,
            refresh_token: session.refresh_token,
            user: session.user,
        }
    }
}

impl Session {
    /// Create a session from an access token and a user profile.
    ///
    /// # Errors
    ///
    /// Returns an error if the access token is empty.
    pub fn new(access_token: AccessToken, user: UserProfile) -> Result<Self, Error> {
        if access_token.is_empty() {
            return Err(InvalidInputError::EmptyToken.into());
        }

        Ok(Self {
            access_token,
            refresh_token: None,
            user,
        })
    }

    /// Attach a refresh token.
    pub fn with_refresh_token(mut self, refresh_token: RefreshToken) -> Self {
        self.refresh_token = Some(refresh_token);
        self
    }

    /// Build the replacement session after a token refresh.
    ///
    /// The profile carries over; the refresh token is replaced only when the
    /// backend issued a new one.
    pub fn refreshed(
        &self,
        access_token: AccessToken,
        refresh_token: Option<RefreshToken>,
    ) -> Result<Self, Error> {
        let mut session = Session::new(access_token, self.user.clone())?;
        session.refresh_token = refresh_token.or_else(|| self.refresh_token.clone());
        Ok(session)
    }

    /// Parse a persisted session record.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serialize the session record.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Returns the access token.
    pub fn access_token(&self) -> &AccessToken {
        &self.access_token
    }

    /// Returns the refresh token, if one is held.
    pub fn refresh_token(&self) -> Option<&RefreshToken> {
        self.refresh_token.as_ref()
    }

    /// Returns the user profile.
    pub fn user(&self) -> &UserProfile {
        &self.user
    }
}
