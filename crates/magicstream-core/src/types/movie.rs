//! Movie catalogue payloads returned by the backend.

use serde::{Deserialize, Deserializer, Serialize};

/// A movie genre.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genre {
    pub genre_id: i64,
    pub genre_name: String,
}

/// The ranking derived from an admin review.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Ranking {
    #[serde(default)]
    pub ranking_value: i64,
    #[serde(default)]
    pub ranking_name: String,
}

/// Decode a list the backend may send as `null`.
pub(crate) fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

/// A movie record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    /// Backend document id; opaque to the client.
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub imdb_id: String,
    pub title: String,
    #[serde(default)]
    pub poster_path: String,
    #[serde(default)]
    pub youtube_id: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub genre: Vec<Genre>,
    #[serde(default)]
    pub admin_review: String,
    #[serde(default)]
    pub ranking: Ranking,
}

impl Movie {
    /// Comma-separated genre names.
    pub fn genre_names(&self) -> String {
        self.genre
            .iter()
            .map(|g| g.genre_name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Result of an admin review update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewUpdate {
    pub ranking_name: String,
    pub admin_review: String,
}

/// A registration request for a new user account.
#[derive(Debug, Clone, Serialize)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub role: String,
    pub favourite_genres: Vec<Genre>,
}

impl NewUser {
    /// Create a registration request with the `USER` role.
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            email: email.into(),
            password: password.into(),
            role: "USER".to_string(),
            favourite_genres: Vec::new(),
        }
    }
}
