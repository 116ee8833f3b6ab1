//! Output formatting helpers.

use anyhow::Result;
use colored::Colorize;
use serde::Serialize;

use magicstream_core::{Movie, UserProfile};

/// Print a success message.
pub fn success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

/// Print an error message.
pub fn error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

/// Print a progress or status note to stderr.
pub fn note(msg: &str) {
    eprintln!("{}", msg.dimmed());
}

/// Print a labeled field.
pub fn field(label: &str, value: &str) {
    println!("{}: {}", label.dimmed(), value);
}

/// Print a value as pretty-printed JSON.
pub fn json_pretty<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{}", json);
    Ok(())
}

/// Print one movie as a single line.
pub fn movie_line(movie: &Movie) {
    let genres = movie.genre_names();
    if genres.is_empty() {
        println!("{}  {}", movie.imdb_id.dimmed(), movie.title.bold());
    } else {
        println!(
            "{}  {}  {}",
            movie.imdb_id.dimmed(),
            movie.title.bold(),
            format!("({})", genres).dimmed()
        );
    }
}

/// Print a movie's full details.
pub fn movie_details(movie: &Movie) {
    field("IMDB", &movie.imdb_id);
    field("Title", &movie.title);
    if !movie.genre.is_empty() {
        field("Genres", &movie.genre_names());
    }
    if !movie.ranking.ranking_name.is_empty() {
        field("Ranking", &movie.ranking.ranking_name);
    }
    if !movie.admin_review.is_empty() {
        field("Review", &movie.admin_review);
    }
    if !movie.youtube_id.is_empty() {
        field(
            "Trailer",
            &format!("https://www.youtube.com/watch?v={}", movie.youtube_id),
        );
    }
}

/// Print the signed-in user's profile.
pub fn profile(user: &UserProfile) {
    field("Name", &user.display_name());
    field("Email", &user.email);
    if !user.role.is_empty() {
        field("Role", &user.role);
    }
    if !user.favourite_genres.is_empty() {
        let genres: Vec<&str> = user
            .favourite_genres
            .iter()
            .map(|g| g.genre_name.as_str())
            .collect();
        field("Favourite genres", &genres.join(", "));
    }
}
