//! Refresh token command implementation.

use anyhow::{Context, Result};
use clap::Args;

use crate::app::App;
use crate::output;

#[derive(Args, Debug)]
pub struct RefreshTokenArgs {}

pub async fn run(app: &App, _args: RefreshTokenArgs) -> Result<()> {
    app.session()?;

    output::note("Refreshing session...");

    let session = app
        .api()
        .refresh()
        .await
        .context("Failed to refresh session")?;

    output::success("Session refreshed successfully");
    output::field("User", &session.user().display_name());

    Ok(())
}
