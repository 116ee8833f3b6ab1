//! Login command implementation.

use anyhow::{Context, Result};
use clap::Args;

use magicstream_core::Credentials;

use crate::app::App;
use crate::output;

#[derive(Args, Debug)]
pub struct LoginArgs {
    /// Account email
    #[arg(long)]
    pub email: String,

    /// Account password
    #[arg(long, env = "MAGICSTREAM_PASSWORD", hide_env_values = true)]
    pub password: String,
}

pub async fn run(app: &App, args: LoginArgs) -> Result<()> {
    let credentials = Credentials::new(&args.email, &args.password);

    output::note("Logging in...");

    let session = app
        .api()
        .login(&credentials)
        .await
        .context("Failed to login")?;

    output::success("Logged in successfully");
    println!();
    output::profile(session.user());

    Ok(())
}
