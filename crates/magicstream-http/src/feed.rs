//! Fetch state for list views, guarded against stale results.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::watch;
use tracing::{debug, warn};

use magicstream_core::Result;

/// Message shown when the movie listing comes back empty.
pub const NO_MOVIES_MESSAGE: &str = "There are currently no movies available";

/// Message shown when the movie listing cannot be fetched.
pub const FETCH_ERROR_MESSAGE: &str = "Error fetching movies";

/// Hands out tickets so only the newest fetch may publish its result.
#[derive(Debug, Default)]
pub struct RequestGeneration {
    current: AtomicU64,
}

/// Identifies one fetch issued by a [`RequestGeneration`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

impl RequestGeneration {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new fetch, invalidating every earlier ticket.
    pub fn begin(&self) -> Ticket {
        Ticket(self.current.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// True if no fetch has started since `ticket` was issued.
    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.current.load(Ordering::SeqCst) == ticket.0
    }
}

/// What a list view should show.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedState<T> {
    /// Nothing requested yet.
    Idle,
    /// A fetch is in flight.
    Loading,
    /// The fetch finished. `message` is set when there is nothing to show.
    Ready {
        items: Vec<T>,
        message: Option<String>,
    },
    /// The fetch failed; carries the user-facing message.
    Failed(String),
}

impl<T> FeedState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, FeedState::Loading)
    }

    /// The loaded items, empty unless ready.
    pub fn items(&self) -> &[T] {
        match self {
            FeedState::Ready { items, .. } => items,
            _ => &[],
        }
    }

    /// The message to show instead of items, if any.
    pub fn message(&self) -> Option<&str> {
        match self {
            FeedState::Ready { message, .. } => message.as_deref(),
            FeedState::Failed(message) => Some(message),
            _ => None,
        }
    }
}

/// Holder for one list view's fetch state.
///
/// A fetch takes a ticket when it starts; when it finishes its result is
/// applied only if no newer fetch has started in the meantime.
#[derive(Debug, Clone)]
pub struct Feed<T> {
    generation: Arc<RequestGeneration>,
    state: Arc<watch::Sender<FeedState<T>>>,
    empty_message: String,
    error_message: String,
}

impl<T: Clone> Feed<T> {
    /// Create a feed with the messages to show for an empty or failed fetch.
    pub fn new(empty_message: impl Into<String>, error_message: impl Into<String>) -> Self {
        let (state, _) = watch::channel(FeedState::Idle);
        Self {
            generation: Arc::new(RequestGeneration::new()),
            state: Arc::new(state),
            empty_message: empty_message.into(),
            error_message: error_message.into(),
        }
    }

    /// A feed using the movie listing's messages.
    pub fn movies() -> Self {
        Self::new(NO_MOVIES_MESSAGE, FETCH_ERROR_MESSAGE)
    }

    /// Mark a fetch as started and return its ticket.
    pub fn begin(&self) -> Ticket {
        let ticket = self.generation.begin();
        self.state.send_replace(FeedState::Loading);
        ticket
    }

    /// Apply the result of the fetch holding `ticket`.
    ///
    /// Returns false, leaving the state untouched, if a newer fetch has
    /// started since.
    pub fn complete(&self, ticket: Ticket, result: Result<Vec<T>>) -> bool {
        if !self.generation.is_current(ticket) {
            debug!(?ticket, "Discarding stale fetch result");
            return false;
        }

        let next = match result {
            Ok(items) if items.is_empty() => FeedState::Ready {
                items,
                message: Some(self.empty_message.clone()),
            },
            Ok(items) => FeedState::Ready {
                items,
                message: None,
            },
            Err(e) => {
                warn!(error = %e, "Fetch failed");
                FeedState::Failed(self.error_message.clone())
            }
        };
        self.state.send_replace(next);
        true
    }

    /// Run `fetch` under a fresh ticket and return the resulting state.
    pub async fn load<F>(&self, fetch: F) -> FeedState<T>
    where
        F: Future<Output = Result<Vec<T>>>,
    {
        let ticket = self.begin();
        let result = fetch.await;
        self.complete(ticket, result);
        self.state()
    }

    /// Returns a copy of the current state.
    pub fn state(&self) -> FeedState<T> {
        self.state.borrow().clone()
    }

    /// Subscribe to state changes.
    pub fn subscribe(&self) -> watch::Receiver<FeedState<T>> {
        self.state.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use magicstream_core::error::{Error, TransportError};

    fn offline() -> Error {
        Error::Transport(TransportError::Connection {
            message: "connection refused".to_string(),
        })
    }

    #[test]
    fn newer_ticket_invalidates_older() {
        let generation = RequestGeneration::new();
        let first = generation.begin();
        assert!(generation.is_current(first));

        let second = generation.begin();
        assert!(!generation.is_current(first));
        assert!(generation.is_current(second));
    }

    #[test]
    fn stale_result_is_discarded() {
        let feed: Feed<&str> = Feed::movies();
        let slow = feed.begin();
        let fast = feed.begin();

        assert!(feed.complete(fast, Ok(vec!["Heat"])));
        assert!(!feed.complete(slow, Ok(vec!["Alien"])));
        assert_eq!(feed.state().items(), ["Heat"]);
    }

    #[test]
    fn stale_failure_does_not_clobber_result() {
        let feed: Feed<&str> = Feed::movies();
        let slow = feed.begin();
        let fast = feed.begin();

        feed.complete(fast, Ok(vec!["Heat"]));
        feed.complete(slow, Err(offline()));
        assert!(feed.state().message().is_none());
    }

    #[test]
    fn empty_and_failed_messages() {
        let feed: Feed<&str> = Feed::movies();

        let ticket = feed.begin();
        assert!(feed.state().is_loading());
        feed.complete(ticket, Ok(vec![]));
        assert_eq!(feed.state().message(), Some(NO_MOVIES_MESSAGE));

        let ticket = feed.begin();
        feed.complete(ticket, Err(offline()));
        assert_eq!(feed.state(), FeedState::Failed(FETCH_ERROR_MESSAGE.to_string()));
        assert!(feed.state().items().is_empty());
    }

    #[tokio::test]
    async fn load_publishes_to_subscribers() {
        let feed: Feed<u32> = Feed::new("nothing", "broken");
        let mut rx = feed.subscribe();
        assert_eq!(*rx.borrow_and_update(), FeedState::Idle);

        let state = feed.load(async { Ok(vec![1, 2, 3]) }).await;
        assert_eq!(state.items(), [1, 2, 3]);

        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().items(), [1, 2, 3]);
    }
}
