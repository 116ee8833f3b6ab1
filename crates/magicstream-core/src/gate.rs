//! Access gate for protected destinations.
//!
//! The gate is a pure function of the session state: it never remembers a
//! previous decision.

use std::fmt;

use crate::context::SessionContext;
use crate::Session;

/// A navigation target: an absolute path plus an optional query string.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Location {
    path: String,
    query: Option<String>,
}

impl Location {
    /// Parse `"/path?query"` into a location.
    ///
    /// A missing leading slash is added; an empty query is dropped.
    pub fn new(target: impl AsRef<str>) -> Self {
        let target = target.as_ref().trim();
        let (path, query) = match target.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (target, None),
        };

        let path = if path.starts_with('/') {
            path.to_string()
        } else {
            format!("/{}", path)
        };

        Self {
            path,
            query: query.filter(|q| !q.is_empty()).map(str::to_string),
        }
    }

    /// Returns the path component.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the query string, without the leading `?`.
    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.query {
            Some(query) => write!(f, "{}?{}", self.path, query),
            None => f.write_str(&self.path),
        }
    }
}

impl From<&str> for Location {
    fn from(target: &str) -> Self {
        Location::new(target)
    }
}

/// The location a user tried to reach before being sent to log in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationIntent {
    from: Location,
}

impl NavigationIntent {
    /// Capture `from` as the destination to return to.
    pub fn new(from: Location) -> Self {
        Self { from }
    }

    /// The originally requested location.
    pub fn from(&self) -> &Location {
        &self.from
    }

    /// Consume the intent, yielding the location to resume.
    pub fn into_location(self) -> Location {
        self.from
    }
}

/// Outcome of evaluating the gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    /// Session state is still loading; show a neutral pending state.
    Pending,
    /// Proceed to the requested location.
    Allow(Location),
    /// Send the user to log in, remembering where they were going.
    Redirect {
        to: Location,
        intent: NavigationIntent,
    },
}

/// Guards protected locations on session presence.
///
/// With no protected prefixes configured, every location is protected.
///
/// # Example
///
/// ```
/// use magicstream_core::{AccessGate, GateDecision, Location};
///
/// let gate = AccessGate::new("/login").protect("/recommended");
///
/// match gate.evaluate(None, false, &Location::new("/recommended")) {
///     GateDecision::Redirect { to, intent } => {
///         assert_eq!(to.path(), "/login");
///         assert_eq!(intent.from().path(), "/recommended");
///     }
///     other => panic!("unexpected decision: {other:?}"),
/// }
///
/// assert_eq!(
///     gate.evaluate(None, false, &Location::new("/movies")),
///     GateDecision::Allow(Location::new("/movies")),
/// );
/// ```
#[derive(Debug, Clone)]
pub struct AccessGate {
    login: Location,
    home: Location,
    protected: Vec<String>,
}

impl AccessGate {
    /// Create a gate that redirects to `login`.
    pub fn new(login: impl Into<Location>) -> Self {
        Self {
            login: login.into(),
            home: Location::new("/"),
            protected: Vec::new(),
        }
    }

    /// Protect every location whose path is `prefix` or lies below it.
    pub fn protect(mut self, prefix: impl AsRef<str>) -> Self {
        let prefix = Location::new(prefix).path;
        self.protected
            .push(prefix.trim_end_matches('/').to_string());
        self
    }

    /// Where to go after login when no intent was captured.
    pub fn with_home(mut self, home: impl Into<Location>) -> Self {
        self.home = home.into();
        self
    }

    /// The login entry point.
    pub fn login(&self) -> &Location {
        &self.login
    }

    /// Returns true if `target` requires a session.
    pub fn is_protected(&self, target: &Location) -> bool {
        if self.protected.is_empty() {
            return target.path != self.login.path;
        }

        self.protected.iter().any(|prefix| {
            prefix.is_empty()
                || target.path == *prefix
                || target
                    .path
                    .strip_prefix(prefix.as_str())
                    .is_some_and(|rest| rest.starts_with('/'))
        })
    }

    /// Decide what to do with a navigation to `target`.
    pub fn evaluate(
        &self,
        session: Option<&Session>,
        loading: bool,
        target: &Location,
    ) -> GateDecision {
        if !self.is_protected(target) {
            return GateDecision::Allow(target.clone());
        }

        if loading {
            return GateDecision::Pending;
        }

        match session {
            Some(_) => GateDecision::Allow(target.clone()),
            None => GateDecision::Redirect {
                to: self.login.clone(),
                intent: NavigationIntent::new(target.clone()),
            },
        }
    }

    /// Evaluate against the current state of `context`.
    pub fn check(&self, context: &SessionContext, target: &Location) -> GateDecision {
        let state = context.snapshot();
        self.evaluate(state.session(), state.is_loading(), target)
    }

    /// Where the login flow should continue once a session exists.
    pub fn resume(&self, intent: Option<NavigationIntent>) -> Location {
        intent
            .map(NavigationIntent::into_location)
            .unwrap_or_else(|| self.home.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemorySessionStore;
    use std::sync::Arc;

    fn ana() -> Session {
        Session::from_json(r#"{"accessToken":"t1","first_name":"Ana"}"#).unwrap()
    }

    #[test]
    fn location_parsing() {
        let location = Location::new("recommended?page=2");
        assert_eq!(location.path(), "/recommended");
        assert_eq!(location.query(), Some("page=2"));
        assert_eq!(location.to_string(), "/recommended?page=2");
        assert_eq!(Location::new("/movies?").query(), None);
    }

    #[test]
    fn pending_while_loading() {
        let gate = AccessGate::new("/login");
        let target = Location::new("/recommended");
        assert_eq!(gate.evaluate(None, true, &target), GateDecision::Pending);
        assert_eq!(
            gate.evaluate(Some(&ana()), true, &target),
            GateDecision::Pending
        );
    }

    #[test]
    fn redirects_without_session_carrying_target() {
        let gate = AccessGate::new("/login");
        for target in ["/recommended", "/movie/tt0111161?tab=review", "/"] {
            let target = Location::new(target);
            match gate.evaluate(None, false, &target) {
                GateDecision::Redirect { to, intent } => {
                    assert_eq!(to, Location::new("/login"));
                    assert_eq!(intent.from(), &target);
                }
                other => panic!("expected redirect for {target}, got {other:?}"),
            }
        }
    }

    #[test]
    fn allows_with_session() {
        let gate = AccessGate::new("/login");
        let target = Location::new("/recommended");
        assert_eq!(
            gate.evaluate(Some(&ana()), false, &target),
            GateDecision::Allow(target)
        );
    }

    #[test]
    fn login_page_is_never_gated() {
        let gate = AccessGate::new("/login");
        let login = Location::new("/login");
        assert_eq!(
            gate.evaluate(None, false, &login),
            GateDecision::Allow(login)
        );
    }

    #[test]
    fn protected_prefixes() {
        let gate = AccessGate::new("/login")
            .protect("/recommended")
            .protect("/movie/");

        assert!(gate.is_protected(&Location::new("/recommended")));
        assert!(gate.is_protected(&Location::new("/movie/tt1")));
        assert!(!gate.is_protected(&Location::new("/movies")));
        assert!(!gate.is_protected(&Location::new("/recommendedmovies")));
    }

    #[test]
    fn resume_prefers_intent() {
        let gate = AccessGate::new("/login").with_home("/movies");
        let intent = NavigationIntent::new(Location::new("/recommended"));
        assert_eq!(gate.resume(Some(intent)), Location::new("/recommended"));
        assert_eq!(gate.resume(None), Location::new("/movies"));
    }

    #[tokio::test]
    async fn check_reads_context() {
        let context = SessionContext::new(Arc::new(MemorySessionStore::new()));
        let gate = AccessGate::new("/login");
        let target = Location::new("/recommended");

        assert_eq!(gate.check(&context, &target), GateDecision::Pending);

        context.initialize().await;
        assert!(matches!(
            gate.check(&context, &target),
            GateDecision::Redirect { .. }
        ));

        context.set_session(Some(ana())).await;
        assert_eq!(gate.check(&context, &target), GateDecision::Allow(target));
    }
}
