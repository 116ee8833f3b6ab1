//! Process-wide wiring: saved session, backend client and access gate.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use directories::ProjectDirs;
use tracing::debug;

use magicstream_core::{AccessGate, ApiUrl, GateDecision, Location, Session, SessionContext};
use magicstream_file::FileSessionStore;
use magicstream_http::{ClientConfig, HttpTransport, MovieApi};

/// Locations that need a signed-in user.
const PROTECTED: &[&str] = &["/recommended", "/movie", "/review"];

/// Resolve the session directory, preferring an explicit override.
pub fn session_dir(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(dir) = explicit {
        return Ok(dir.to_path_buf());
    }

    let dirs = ProjectDirs::from("", "", "magicstream")
        .context("Could not determine data directory")?;
    Ok(dirs.data_dir().to_path_buf())
}

/// Everything a command needs.
pub struct App {
    api: MovieApi<HttpTransport>,
    store: FileSessionStore,
    gate: AccessGate,
}

impl App {
    /// Load the saved session and connect to the backend.
    pub async fn open(api_url: Option<&str>, explicit_dir: Option<&Path>) -> Result<Self> {
        let store = FileSessionStore::new(session_dir(explicit_dir)?);
        debug!(path = %store.record_path().display(), "Using session record");

        let context = SessionContext::new(Arc::new(store.clone()));
        context.initialize().await;

        let mut config = ClientConfig::from_env().context("Invalid client configuration")?;
        if let Some(url) = api_url {
            config.base_url = ApiUrl::new(url).context("Invalid API URL")?;
        }

        let api = MovieApi::connect(&config, context).context("Failed to create HTTP client")?;

        let gate = PROTECTED
            .iter()
            .fold(AccessGate::new("/login"), |gate, prefix| gate.protect(prefix));

        Ok(Self { api, store, gate })
    }

    pub fn api(&self) -> &MovieApi<HttpTransport> {
        &self.api
    }

    pub fn context(&self) -> &SessionContext {
        self.api.context()
    }

    pub fn store(&self) -> &FileSessionStore {
        &self.store
    }

    /// Returns the current session or an error telling the user to log in.
    pub fn session(&self) -> Result<Session> {
        self.context()
            .session()
            .context("No active session. Run 'magicstream login' first.")
    }

    /// Run the access gate for `target`, failing with a login prompt when
    /// the user is signed out.
    pub fn enter(&self, target: &str) -> Result<Location> {
        match self.gate.check(self.context(), &Location::new(target)) {
            GateDecision::Allow(location) => Ok(location),
            GateDecision::Redirect { to, intent } => bail!(
                "Login required to open {}. Run 'magicstream login' (redirected to {}).",
                intent.from(),
                to
            ),
            GateDecision::Pending => bail!("Session is still loading"),
        }
    }
}
