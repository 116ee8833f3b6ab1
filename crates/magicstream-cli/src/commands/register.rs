//! Register command implementation.

use anyhow::{Context, Result, bail};
use clap::Args;

use magicstream_core::{Genre, NewUser};

use crate::app::App;
use crate::output;

#[derive(Args, Debug)]
pub struct RegisterArgs {
    #[arg(long)]
    pub first_name: String,

    #[arg(long)]
    pub last_name: String,

    #[arg(long)]
    pub email: String,

    #[arg(long, env = "MAGICSTREAM_PASSWORD", hide_env_values = true)]
    pub password: String,

    /// Favourite genre name; repeat for several
    #[arg(long = "genre")]
    pub genres: Vec<String>,
}

pub async fn run(app: &App, args: RegisterArgs) -> Result<()> {
    let mut user = NewUser::new(args.first_name, args.last_name, args.email, args.password);

    if !args.genres.is_empty() {
        user.favourite_genres = resolve_genres(app, &args.genres).await?;
    }

    app.api()
        .register(&user)
        .await
        .context("Failed to register")?;

    output::success("Account created successfully");
    output::field("Email", &user.email);
    Ok(())
}

/// Match genre names against the backend's genre list.
async fn resolve_genres(app: &App, names: &[String]) -> Result<Vec<Genre>> {
    let known = app
        .api()
        .genres()
        .await
        .context("Failed to fetch genres")?;

    names
        .iter()
        .map(|name| {
            match known
                .iter()
                .find(|g| g.genre_name.eq_ignore_ascii_case(name.trim()))
            {
                Some(genre) => Ok(genre.clone()),
                None => bail!("Unknown genre '{}'. Run 'magicstream genres' to list them.", name),
            }
        })
        .collect()
}
