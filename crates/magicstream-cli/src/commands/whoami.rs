//! Whoami command implementation.

use anyhow::Result;
use clap::Args;

use crate::app::App;
use crate::output;

#[derive(Args, Debug)]
pub struct WhoamiArgs {
    /// Print the saved profile as JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn run(app: &App, args: WhoamiArgs) -> Result<()> {
    let session = app.session()?;

    if args.json {
        return output::json_pretty(session.user());
    }

    output::profile(session.user());
    output::field("Session", &app.store().record_path().display().to_string());

    Ok(())
}
