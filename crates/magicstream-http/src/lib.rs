//! magicstream-http - HTTP clients for the MagicStream backend.
//!
//! [`ApiClient`] talks to public endpoints. [`AuthedClient`] attaches the
//! current session's credential and refreshes it once when the backend
//! rejects it. [`MovieApi`] puts typed operations on top of both.

mod api;
mod authed;
mod client;
mod config;
mod endpoints;
mod feed;
mod transport;

#[cfg(test)]
mod testing;

pub use api::MovieApi;
pub use authed::AuthedClient;
pub use client::ApiClient;
pub use config::{API_URL_ENV, ClientConfig, DEFAULT_API_URL, TIMEOUT_ENV};
pub use endpoints::{
    ACCESS_TOKEN_COOKIE, GENRES, LOGIN, LOGOUT, MOVIE, MOVIES, RECOMMENDED_MOVIES, REFRESH,
    REFRESH_TOKEN_COOKIE, REGISTER, UPDATE_REVIEW,
};
pub use feed::{FETCH_ERROR_MESSAGE, Feed, FeedState, NO_MOVIES_MESSAGE, RequestGeneration, Ticket};
pub use transport::HttpTransport;
