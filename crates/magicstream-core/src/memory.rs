//! In-memory session store.

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::error::StorageError;
use crate::traits::SessionStore;
use crate::{Result, Session};

/// A [`SessionStore`] that keeps the serialized record in memory.
///
/// The record is held as JSON text, the same shape a durable store writes,
/// so corrupt records can be seeded for tests with [`MemorySessionStore::with_raw`].
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    record: Mutex<Option<String>>,
}

impl MemorySessionStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding `raw` as the stored record, valid or not.
    pub fn with_raw(raw: impl Into<String>) -> Self {
        Self {
            record: Mutex::new(Some(raw.into())),
        }
    }

    /// Returns the stored record text.
    pub async fn raw(&self) -> Option<String> {
        self.record.lock().await.clone()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn load(&self) -> Result<Option<Session>> {
        let record = self.record.lock().await;
        let Some(raw) = record.as_deref() else {
            return Ok(None);
        };

        match Session::from_json(raw) {
            Ok(session) => Ok(Some(session)),
            Err(e) => {
                warn!(error = %e, "Discarding unreadable session record");
                Ok(None)
            }
        }
    }

    async fn save(&self, session: &Session) -> Result<()> {
        let json = session.to_json().map_err(|e| StorageError::Serialize {
            message: e.to_string(),
        })?;
        *self.record.lock().await = Some(json);
        debug!("Session record saved");
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        *self.record.lock().await = None;
        debug!("Session record cleared");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn empty_store_loads_none() {
        let store = MemorySessionStore::new();
        assert!(store.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn corrupt_record_loads_none() {
        for raw in ["{not json", "[]", r#"{"first_name":"Ana"}"#, r#"{"accessToken":""}"#] {
            let store = MemorySessionStore::with_raw(raw);
            assert!(store.load().await.unwrap().is_none(), "record {raw:?}");
        }
    }

    #[tokio::test]
    async fn save_then_clear() {
        let store = MemorySessionStore::new();
        let session = Session::from_json(r#"{"accessToken":"t1","first_name":"Ana"}"#).unwrap();

        store.save(&session).await.unwrap();
        assert_eq!(store.load().await.unwrap(), Some(session));

        store.clear().await.unwrap();
        assert!(store.load().await.unwrap().is_none());
        assert!(store.raw().await.is_none());
    }
}
