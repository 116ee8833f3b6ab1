//! Subcommand implementations.

pub mod genres;
pub mod login;
pub mod logout;
pub mod movie;
pub mod movies;
pub mod recommended;
pub mod refresh_token;
pub mod register;
pub mod review;
pub mod whoami;
