//! Opaque bearer credentials.
//!
//! Both token kinds serialize as plain strings and print as `[REDACTED]` in
//! Debug output, so a session can be logged without leaking them.

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! secret_token {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wrap a raw token value.
            pub fn new(token: impl Into<String>) -> Self {
                Self(token.into())
            }

            /// The raw value, for request headers, bodies and the session record.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// True if the value is blank.
            pub fn is_empty(&self) -> bool {
                self.0.trim().is_empty()
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!(stringify!($name), "([REDACTED])"))
            }
        }
    };
}

secret_token! {
    /// Short-lived credential sent as `Authorization: Bearer <token>`.
    AccessToken
}

secret_token! {
    /// Long-lived credential exchanged at the refresh endpoint for a new
    /// access token. The backend also sets it as an HTTP-only cookie.
    RefreshToken
}
