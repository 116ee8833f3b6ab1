//! magicstream-core - Session model, session context and access gate for the
//! MagicStream client.

pub mod context;
pub mod credentials;
pub mod error;
pub mod gate;
pub mod memory;
pub mod session;
pub mod tokens;
pub mod traits;
pub mod types;

pub use context::{SessionContext, SessionState};
pub use credentials::Credentials;
pub use error::Error;
pub use gate::{AccessGate, GateDecision, Location, NavigationIntent};
pub use memory::MemorySessionStore;
pub use session::{Session, UserProfile};
pub use tokens::{AccessToken, RefreshToken};
pub use traits::{ApiRequest, ApiResponse, Method, SESSION_KEY, SessionStore, Transport};
pub use types::{ApiUrl, Genre, Movie, NewUser, Ranking, ReviewUpdate};

/// Result type alias using the crate's Error type.
pub type Result<T> = std::result::Result<T, Error>;
