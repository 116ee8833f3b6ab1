use std::path::{Path, PathBuf};
use std::process::Output;

use serde_json::{Value, json};
use tempfile::TempDir;
use wiremock::matchers::{HeaderRegexMatcher, body_json, header_regex, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// An isolated CLI environment: its own session directory and mock backend.
pub struct Harness {
    pub server: MockServer,
    dir: TempDir,
}

impl Harness {
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
            dir: TempDir::new().expect("Failed to create temp dir"),
        }
    }

    pub fn session_dir(&self) -> &Path {
        self.dir.path()
    }

    pub fn record_path(&self) -> PathBuf {
        self.dir.path().join("user.json")
    }

    /// Read the saved session record, if any.
    pub fn record(&self) -> Option<Value> {
        let content = std::fs::read_to_string(self.record_path()).ok()?;
        serde_json::from_str(&content).ok()
    }

    /// Run the CLI binary against the mock backend.
    pub async fn run(&self, args: &[&str]) -> Output {
        tokio::process::Command::new(env!("CARGO_BIN_EXE_magicstream"))
            .args(args)
            .env("MAGICSTREAM_API_URL", self.server.uri())
            .env("MAGICSTREAM_SESSION_DIR", self.session_dir())
            .env("NO_COLOR", "1")
            .env_remove("MAGICSTREAM_PASSWORD")
            .env_remove("RUST_LOG")
            .output()
            .await
            .expect("Failed to execute CLI")
    }

    /// Run the CLI and expect success, returning stdout.
    pub async fn run_success(&self, args: &[&str]) -> String {
        let output = self.run(args).await;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            panic!("CLI command failed: {:?}\nstderr: {}", args, stderr);
        }
        String::from_utf8_lossy(&output.stdout).to_string()
    }

    /// Run the CLI and expect failure, returning stderr.
    pub async fn run_failure(&self, args: &[&str]) -> String {
        let output = self.run(args).await;
        if output.status.success() {
            panic!("CLI command should have failed: {:?}", args);
        }
        String::from_utf8_lossy(&output.stderr).to_string()
    }

    /// Mount a login endpoint issuing `access`/`refresh` in the body.
    pub async fn mount_login(&self, access: &str, refresh: &str) {
        Mock::given(method("POST"))
            .and(path("/login"))
            .and(body_json(json!({
                "email": "ana@example.com",
                "password": "secret123"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "user_id": "u1",
                "first_name": "Ana",
                "last_name": "Lima",
                "email": "ana@example.com",
                "role": "ADMIN",
                "token": access,
                "refresh_token": refresh,
                "favourite_genres": [{"genre_id": 1, "genre_name": "Drama"}]
            })))
            .mount(&self.server)
            .await;
    }

    pub async fn login(&self) {
        self.run_success(&[
            "login",
            "--email",
            "ana@example.com",
            "--password",
            "secret123",
        ])
        .await;
    }
}

pub fn movie(imdb_id: &str, title: &str) -> Value {
    json!({
        "imdb_id": imdb_id,
        "title": title,
        "genre": [{"genre_id": 1, "genre_name": "Drama"}],
        "ranking": {"ranking_value": 999, "ranking_name": "Not_Ranked"}
    })
}

/// Matches a request presenting `name=value` in its `Cookie` header.
pub fn cookie(name: &str, value: &str) -> HeaderRegexMatcher {
    header_regex("cookie", &format!("(^|; ){name}={value}(;|$)"))
}
