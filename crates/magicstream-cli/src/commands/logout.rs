//! Logout command implementation.

use anyhow::{Context, Result};
use clap::Args;

use crate::app::App;
use crate::output;

#[derive(Args, Debug)]
pub struct LogoutArgs {}

pub async fn run(app: &App, _args: LogoutArgs) -> Result<()> {
    if app.context().session().is_none() {
        output::note("Not logged in.");
        return Ok(());
    }

    // The saved session is gone even if the backend call fails.
    app.api()
        .logout()
        .await
        .context("Logged out locally, but the server did not confirm")?;

    output::success("Logged out");
    Ok(())
}
