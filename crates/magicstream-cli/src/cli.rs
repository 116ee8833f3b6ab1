//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::commands::{
    genres::GenresArgs, login::LoginArgs, logout::LogoutArgs, movie::MovieArgs,
    movies::MoviesArgs, recommended::RecommendedArgs, refresh_token::RefreshTokenArgs,
    register::RegisterArgs, review::ReviewArgs, whoami::WhoamiArgs,
};

/// Command-line client for the MagicStream movie service.
#[derive(Parser, Debug)]
#[command(name = "magicstream")]
#[command(author, version = env!("MAGICSTREAM_VERSION"), about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Output logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// Backend base URL
    #[arg(long, global = true, env = "MAGICSTREAM_API_URL")]
    pub api_url: Option<String>,

    /// Directory holding the saved session
    #[arg(long, global = true, env = "MAGICSTREAM_SESSION_DIR")]
    pub session_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Sign in and save the session
    Login(LoginArgs),

    /// Sign out and forget the saved session
    Logout(LogoutArgs),

    /// Display the signed-in user
    Whoami(WhoamiArgs),

    /// Refresh the saved session's access token
    RefreshToken(RefreshTokenArgs),

    /// Create a new account
    Register(RegisterArgs),

    /// List every movie
    Movies(MoviesArgs),

    /// List every genre
    Genres(GenresArgs),

    /// List movies recommended for you (requires login)
    Recommended(RecommendedArgs),

    /// Show one movie (requires login)
    Movie(MovieArgs),

    /// Set the admin review for a movie (requires login as admin)
    Review(ReviewArgs),
}
