//! Error types for the MagicStream client.
//!
//! This module provides a unified error type with explicit variants for
//! storage, transport, authentication, protocol, and input validation errors.

use std::fmt;
use thiserror::Error;

/// The unified error type for MagicStream client operations.
///
/// Callers match on the variant to decide how to degrade: storage errors are
/// recovered locally, transport and protocol errors surface as a message.
#[derive(Debug, Error)]
pub enum Error {
    /// Persisted session storage errors.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// Network transport errors (connection, timeout).
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Authentication errors (no session, missing credential, refresh rejected).
    #[error("authentication error: {0}")]
    Auth(#[from] AuthError),

    /// Protocol errors (non-success responses from the backend).
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Input validation errors (invalid URL, empty token, bad path).
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InvalidInputError),
}

impl Error {
    /// Returns true if this error means the access credential was rejected.
    pub fn is_auth_error(&self) -> bool {
        match self {
            Error::Auth(_) => true,
            Error::Protocol(err) => err.is_auth_error(),
            _ => false,
        }
    }
}

/// Errors reading or writing the persisted session record.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The record could not be read.
    #[error("failed to read session record: {message}")]
    Read { message: String },

    /// The record could not be written or removed.
    #[error("failed to write session record: {message}")]
    Write { message: String },

    /// The record could not be serialized.
    #[error("failed to serialize session record: {message}")]
    Serialize { message: String },
}

/// Transport-level errors.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Network connection failed.
    #[error("connection failed: {message}")]
    Connection { message: String },

    /// Request timed out.
    #[error("request timed out: {message}")]
    Timeout { message: String },

    /// The response body could not be decoded.
    #[error("invalid response body: {message}")]
    Decode { message: String },

    /// Generic HTTP error.
    #[error("HTTP error: {message}")]
    Http { message: String },
}

/// Authentication-related errors.
#[derive(Debug, Error)]
pub enum AuthError {
    /// No session is held.
    #[error("not authenticated")]
    NotAuthenticated,

    /// A login or refresh payload carried no usable access token.
    #[error("response did not include an access token")]
    MissingAccessToken,

    /// The refresh endpoint rejected the refresh attempt.
    #[error("session refresh rejected: {reason}")]
    RefreshRejected { reason: String },

    /// The session was signed out or replaced while a refresh was in flight;
    /// the refreshed credential was discarded.
    #[error("session changed during refresh")]
    SessionChanged,
}

/// Protocol-level errors from backend responses.
#[derive(Debug, Clone)]
pub struct ProtocolError {
    /// HTTP status code.
    pub status: u16,
    /// Error code or summary from the backend (if present).
    pub error: Option<String>,
    /// Detail message from the backend (if present).
    pub message: Option<String>,
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HTTP {}", self.status)?;
        if let Some(ref error) = self.error {
            write!(f, " [{}]", error)?;
        }
        if let Some(ref message) = self.message {
            write!(f, ": {}", message)?;
        }
        Ok(())
    }
}

impl std::error::Error for ProtocolError {}

impl ProtocolError {
    /// Create a new protocol error.
    pub fn new(status: u16, error: Option<String>, message: Option<String>) -> Self {
        Self {
            status,
            error,
            message,
        }
    }

    /// Check if this is an authorization failure (expired or invalid credential).
    pub fn is_auth_error(&self) -> bool {
        self.status == 401
    }

    /// Check if the backend rejected the request payload.
    pub fn is_validation_error(&self) -> bool {
        self.status == 400 || self.status == 422
    }
}

/// Input validation errors.
#[derive(Debug, Error)]
pub enum InvalidInputError {
    /// Invalid API base URL.
    #[error("invalid API URL '{value}': {reason}")]
    ApiUrl { value: String, reason: String },

    /// An access token was empty.
    #[error("access token must not be empty")]
    EmptyToken,

    /// Invalid request path.
    #[error("invalid path '{value}': {reason}")]
    Path { value: String, reason: String },

    /// Generic invalid input.
    #[error("invalid input: {message}")]
    Other { message: String },
}
