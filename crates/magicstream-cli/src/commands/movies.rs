//! Movies command implementation.

use anyhow::{Result, bail};
use clap::Args;

use magicstream_core::Movie;
use magicstream_http::{Feed, FeedState};

use crate::app::App;
use crate::output;

#[derive(Args, Debug)]
pub struct MoviesArgs {
    /// Print the listing as JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn run(app: &App, args: MoviesArgs) -> Result<()> {
    let feed = Feed::movies();
    let state = feed.load(app.api().movies()).await;
    show(state, args.json)
}

/// Print a loaded movie feed.
pub(crate) fn show(state: FeedState<Movie>, json: bool) -> Result<()> {
    match state {
        FeedState::Ready { items, .. } if json => output::json_pretty(&items),
        FeedState::Ready { items, message } => {
            if let Some(message) = message {
                output::note(&message);
            }
            for movie in &items {
                output::movie_line(movie);
            }
            Ok(())
        }
        FeedState::Failed(message) => bail!(message),
        FeedState::Idle | FeedState::Loading => Ok(()),
    }
}
