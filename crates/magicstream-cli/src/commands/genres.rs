//! Genres command implementation.

use anyhow::{Context, Result};
use clap::Args;

use crate::app::App;
use crate::output;

#[derive(Args, Debug)]
pub struct GenresArgs {
    /// Print the listing as JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn run(app: &App, args: GenresArgs) -> Result<()> {
    let genres = app
        .api()
        .genres()
        .await
        .context("Failed to fetch genres")?;

    if args.json {
        return output::json_pretty(&genres);
    }

    if genres.is_empty() {
        output::note("No genres found.");
    }
    for genre in &genres {
        println!("{:>4}  {}", genre.genre_id, genre.genre_name);
    }

    Ok(())
}
