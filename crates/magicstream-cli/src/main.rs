//! magicstream - command-line client for the MagicStream movie service.
//!
//! A thin wrapper over `magicstream-http`: the session is kept on disk
//! between invocations and refreshed transparently when it expires.

mod app;
mod cli;
mod commands;
mod output;

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    init_logging(cli.verbose, cli.json_logs);

    let app = match app::App::open(cli.api_url.as_deref(), cli.session_dir.as_deref()).await {
        Ok(app) => app,
        Err(e) => {
            output::error(&format!("{:#}", e));
            return ExitCode::FAILURE;
        }
    };

    let result = match cli.command {
        Commands::Login(args) => commands::login::run(&app, args).await,
        Commands::Logout(args) => commands::logout::run(&app, args).await,
        Commands::Whoami(args) => commands::whoami::run(&app, args).await,
        Commands::RefreshToken(args) => commands::refresh_token::run(&app, args).await,
        Commands::Register(args) => commands::register::run(&app, args).await,
        Commands::Movies(args) => commands::movies::run(&app, args).await,
        Commands::Genres(args) => commands::genres::run(&app, args).await,
        Commands::Recommended(args) => commands::recommended::run(&app, args).await,
        Commands::Movie(args) => commands::movie::run(&app, args).await,
        Commands::Review(args) => commands::review::run(&app, args).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            output::error(&format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbosity: u8, json: bool) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .init();
    }
}
