//! Recommended movies command implementation.

use anyhow::Result;
use clap::Args;

use magicstream_http::Feed;

use crate::app::App;
use crate::commands::movies;

#[derive(Args, Debug)]
pub struct RecommendedArgs {
    /// Print the listing as JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn run(app: &App, args: RecommendedArgs) -> Result<()> {
    app.enter("/recommended")?;

    let feed = Feed::movies();
    let state = feed.load(app.api().recommended()).await;
    movies::show(state, args.json)
}
