//! Core value types.
//!
//! These types enforce their invariants at construction time.

mod api_url;
mod movie;

pub use api_url::ApiUrl;
pub use movie::{Genre, Movie, NewUser, Ranking, ReviewUpdate};
pub(crate) use movie::null_as_empty;
