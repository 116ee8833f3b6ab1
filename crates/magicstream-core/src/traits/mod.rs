//! Core traits for session persistence and HTTP transport.

mod store;
mod transport;

pub use store::{SESSION_KEY, SessionStore};
pub use transport::{ApiRequest, ApiResponse, Method, Transport};
