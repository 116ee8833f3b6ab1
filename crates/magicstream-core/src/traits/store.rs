//! Persisted session store trait.

use async_trait::async_trait;

use crate::{Result, Session};

/// Storage key under which the serialized session record is kept.
pub const SESSION_KEY: &str = "user";

/// Durable storage for the serialized session record.
///
/// The store mirrors the in-memory session; it is never a second source of
/// truth. Implementations must treat a missing or unreadable record as "no
/// session" rather than failing.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Read the stored session.
    ///
    /// Returns `Ok(None)` if nothing is stored or the stored record does not
    /// decode. Only storage I/O failures are returned as errors.
    async fn load(&self) -> Result<Option<Session>>;

    /// Overwrite the stored record with `session`.
    async fn save(&self, session: &Session) -> Result<()>;

    /// Remove the stored record. Clearing an empty store is not an error.
    async fn clear(&self) -> Result<()>;
}
