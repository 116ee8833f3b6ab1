//! Single movie command implementation.

use anyhow::{Context, Result};
use clap::Args;

use crate::app::App;
use crate::output;

#[derive(Args, Debug)]
pub struct MovieArgs {
    /// IMDB id, e.g. tt0111161
    pub imdb_id: String,

    /// Print the movie as JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn run(app: &App, args: MovieArgs) -> Result<()> {
    app.enter(&format!("/movie/{}", args.imdb_id))?;

    let movie = app
        .api()
        .movie(&args.imdb_id)
        .await
        .with_context(|| format!("Failed to fetch movie {}", args.imdb_id))?;

    if args.json {
        return output::json_pretty(&movie);
    }

    output::movie_details(&movie);
    Ok(())
}
