//! Application-lifetime session context.

use std::fmt;
use std::sync::Arc;

use tokio::sync::{Mutex, watch};
use tracing::{debug, info, instrument, warn};

use crate::traits::SessionStore;
use crate::{AccessToken, Session};

/// Lifecycle state of the [`SessionContext`].
#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    /// The persisted record has not been read yet.
    Uninitialized,
    /// Initialization finished; the session may or may not be present.
    Ready(Option<Session>),
}

impl SessionState {
    /// True until initialization has completed.
    pub fn is_loading(&self) -> bool {
        matches!(self, SessionState::Uninitialized)
    }

    /// The current session, if ready and signed in.
    pub fn session(&self) -> Option<&Session> {
        match self {
            SessionState::Ready(session) => session.as_ref(),
            SessionState::Uninitialized => None,
        }
    }
}

/// The single authoritative holder of the current [`Session`].
///
/// The context is an owned handle: clone it and pass it to whatever needs the
/// session (HTTP clients, the access gate, the CLI). Clones share state.
///
/// Every change, including the initialization transition, is published as a
/// whole [`SessionState`] to subscribers and mirrored to the [`SessionStore`].
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use magicstream_core::{MemorySessionStore, SessionContext};
///
/// # async fn example() {
/// let context = SessionContext::new(Arc::new(MemorySessionStore::new()));
/// assert!(context.is_loading());
///
/// context.initialize().await;
/// assert!(!context.is_loading());
/// assert!(context.session().is_none());
/// # }
/// ```
#[derive(Clone)]
pub struct SessionContext {
    inner: Arc<ContextInner>,
}

struct ContextInner {
    store: Arc<dyn SessionStore>,
    state: watch::Sender<SessionState>,
    // Serializes writers so the store always mirrors the latest update.
    writer: Mutex<()>,
}

impl SessionContext {
    /// Create an uninitialized context backed by `store`.
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        let (state, _) = watch::channel(SessionState::Uninitialized);
        Self {
            inner: Arc::new(ContextInner {
                store,
                state,
                writer: Mutex::new(()),
            }),
        }
    }

    /// Load the persisted session and leave the loading state.
    ///
    /// Runs once; later calls return immediately. A store failure is logged
    /// and treated as "no session". If [`set_session`](Self::set_session) ran
    /// first, its value wins and the store is not read.
    #[instrument(skip(self))]
    pub async fn initialize(&self) {
        let _guard = self.inner.writer.lock().await;
        if !self.inner.state.borrow().is_loading() {
            debug!("Session context already initialized");
            return;
        }

        let session = match self.inner.store.load().await {
            Ok(session) => session,
            Err(e) => {
                warn!(error = %e, "Failed to load persisted session");
                None
            }
        };

        info!(signed_in = session.is_some(), "Session context ready");
        self.inner.state.send_replace(SessionState::Ready(session));
    }

    /// Replace the current session and mirror the change to the store.
    ///
    /// `Some` saves the record, `None` clears it. The in-memory value is
    /// authoritative: a persistence failure is logged, not rolled back.
    #[instrument(skip(self, session), fields(signed_in = session.is_some()))]
    pub async fn set_session(&self, session: Option<Session>) {
        let _guard = self.inner.writer.lock().await;
        self.apply(session).await;
    }

    /// Replace the session only while it still holds `expected`.
    ///
    /// Returns false and changes nothing if the session was cleared or
    /// replaced after `expected` was read.
    #[instrument(skip_all)]
    pub async fn replace_if_current(&self, expected: &AccessToken, next: Session) -> bool {
        let _guard = self.inner.writer.lock().await;
        let current = self
            .inner
            .state
            .borrow()
            .session()
            .is_some_and(|s| s.access_token() == expected);
        if !current {
            debug!("Session changed since it was read; keeping the newer one");
            return false;
        }

        self.apply(Some(next)).await;
        true
    }

    // Callers hold the writer lock.
    async fn apply(&self, session: Option<Session>) {
        self.inner
            .state
            .send_replace(SessionState::Ready(session.clone()));

        let persisted = match &session {
            Some(session) => self.inner.store.save(session).await,
            None => self.inner.store.clear().await,
        };

        if let Err(e) = persisted {
            warn!(error = %e, "Failed to persist session change");
        }
    }

    /// Returns a copy of the current state.
    pub fn snapshot(&self) -> SessionState {
        self.inner.state.borrow().clone()
    }

    /// Returns the current session, if any.
    pub fn session(&self) -> Option<Session> {
        self.inner.state.borrow().session().cloned()
    }

    /// Returns the current access token, if signed in.
    pub fn access_token(&self) -> Option<AccessToken> {
        self.inner
            .state
            .borrow()
            .session()
            .map(|s| s.access_token().clone())
    }

    /// True until [`initialize`](Self::initialize) has completed.
    pub fn is_loading(&self) -> bool {
        self.inner.state.borrow().is_loading()
    }

    /// Subscribe to state changes.
    ///
    /// The receiver sees the current state immediately and every later
    /// update as a whole value.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.inner.state.subscribe()
    }

    /// Wait until initialization has completed and return the ready state.
    pub async fn ready(&self) -> SessionState {
        let mut rx = self.subscribe();
        match rx.wait_for(|state| !state.is_loading()).await {
            Ok(state) => state.clone(),
            // The sender lives as long as `self`, so this is unreachable in
            // practice; fall back to the current value.
            Err(_) => self.snapshot(),
        }
    }
}

impl fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.state.borrow();
        f.debug_struct("SessionContext")
            .field("loading", &state.is_loading())
            .field("signed_in", &state.session().is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemorySessionStore;
    use crate::error::{Error, StorageError};
    use crate::Result;
    use async_trait::async_trait;

    fn ana() -> Session {
        Session::from_json(r#"{"accessToken":"t1","first_name":"Ana"}"#).unwrap()
    }

    struct FailingStore;

    #[async_trait]
    impl SessionStore for FailingStore {
        async fn load(&self) -> Result<Option<Session>> {
            Err(Error::Storage(StorageError::Read {
                message: "disk on fire".to_string(),
            }))
        }

        async fn save(&self, _session: &Session) -> Result<()> {
            Err(Error::Storage(StorageError::Write {
                message: "read-only".to_string(),
            }))
        }

        async fn clear(&self) -> Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn initializes_from_store() {
        let store = Arc::new(MemorySessionStore::with_raw(
            r#"{"accessToken":"t1","first_name":"Ana"}"#,
        ));
        let context = SessionContext::new(store);

        assert!(context.is_loading());
        context.initialize().await;

        assert!(!context.is_loading());
        assert_eq!(context.session().unwrap().user().first_name, "Ana");
    }

    #[tokio::test]
    async fn malformed_records_initialize_signed_out() {
        for raw in ["", "null", "{", r#"{"first_name":"Ana"}"#, r#"{"token":""}"#] {
            let context = SessionContext::new(Arc::new(MemorySessionStore::with_raw(raw)));
            context.initialize().await;
            assert!(!context.is_loading(), "record {raw:?}");
            assert!(context.session().is_none(), "record {raw:?}");
        }
    }

    #[tokio::test]
    async fn store_failure_initializes_signed_out() {
        let context = SessionContext::new(Arc::new(FailingStore));
        context.initialize().await;
        assert_eq!(context.snapshot(), SessionState::Ready(None));
    }

    #[tokio::test]
    async fn initialize_runs_once() {
        let store = Arc::new(MemorySessionStore::new());
        let context = SessionContext::new(store.clone());
        context.initialize().await;

        context.set_session(Some(ana())).await;
        store.clear().await.unwrap();
        context.initialize().await;

        assert!(context.session().is_some());
    }

    #[tokio::test]
    async fn store_mirrors_last_update() {
        let store = Arc::new(MemorySessionStore::new());
        let context = SessionContext::new(store.clone());
        context.initialize().await;

        let updates = [
            Some(ana()),
            None,
            None,
            Some(ana().refreshed(AccessToken::new("t2"), None).unwrap()),
            Some(ana()),
            None,
        ];
        for update in updates {
            context.set_session(update.clone()).await;
            assert_eq!(store.load().await.unwrap(), update);
            assert_eq!(context.session(), update);
        }
    }

    #[tokio::test]
    async fn replace_if_current_skips_changed_session() {
        let store = Arc::new(MemorySessionStore::new());
        let context = SessionContext::new(store.clone());
        context.initialize().await;
        context.set_session(Some(ana())).await;

        let t1 = AccessToken::new("t1");
        let next = ana().refreshed(AccessToken::new("t2"), None).unwrap();
        assert!(context.replace_if_current(&t1, next.clone()).await);
        assert_eq!(context.session(), Some(next.clone()));

        // Still expecting t1, but the session now holds t2.
        let stale = ana().refreshed(AccessToken::new("t3"), None).unwrap();
        assert!(!context.replace_if_current(&t1, stale).await);
        assert_eq!(context.session(), Some(next));

        context.set_session(None).await;
        assert!(!context.replace_if_current(&AccessToken::new("t2"), ana()).await);
        assert!(context.session().is_none());
        assert!(store.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn clearing_session_clears_store() {
        let store = Arc::new(MemorySessionStore::new());
        let context = SessionContext::new(store.clone());
        context.initialize().await;

        context.set_session(Some(ana())).await;
        context.set_session(None).await;

        assert!(store.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn persistence_failure_keeps_memory_state() {
        let context = SessionContext::new(Arc::new(FailingStore));
        context.initialize().await;

        context.set_session(Some(ana())).await;
        assert_eq!(context.session(), Some(ana()));
    }

    #[tokio::test]
    async fn subscribers_see_each_update() {
        let context = SessionContext::new(Arc::new(MemorySessionStore::new()));
        let mut rx = context.subscribe();
        assert!(rx.borrow_and_update().is_loading());

        context.initialize().await;
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), SessionState::Ready(None));

        context.set_session(Some(ana())).await;
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().session(), Some(&ana()));
    }

    #[tokio::test]
    async fn ready_waits_for_initialization() {
        let context = SessionContext::new(Arc::new(MemorySessionStore::with_raw(
            r#"{"accessToken":"t1"}"#,
        )));

        let waiter = {
            let context = context.clone();
            tokio::spawn(async move { context.ready().await })
        };
        context.initialize().await;

        let state = waiter.await.unwrap();
        assert!(state.session().is_some());
    }
}
