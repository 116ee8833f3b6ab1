//! Admin review command implementation.

use anyhow::{Context, Result, bail};
use clap::Args;

use crate::app::App;
use crate::output;

#[derive(Args, Debug)]
pub struct ReviewArgs {
    /// IMDB id of the movie to review
    pub imdb_id: String,

    /// Review text
    #[arg(long)]
    pub text: String,
}

pub async fn run(app: &App, args: ReviewArgs) -> Result<()> {
    app.enter(&format!("/review/{}", args.imdb_id))?;

    if args.text.trim().is_empty() {
        bail!("Review text must not be empty");
    }

    output::note("Submitting review...");

    let update = app
        .api()
        .update_review(&args.imdb_id, &args.text)
        .await
        .with_context(|| format!("Failed to update review for {}", args.imdb_id))?;

    output::success("Review saved");
    output::field("Ranking", &update.ranking_name);
    output::field("Review", &update.admin_review);

    Ok(())
}
