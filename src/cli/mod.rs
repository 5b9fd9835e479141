//! CLI module for the Repo Summarizer API
//!
//! Subcommands:
//! - `serve`: run the HTTP server
//! - `migrate`: create or upgrade the PostgreSQL schema
//! - `token`: mint an owner JWT for local use of the key management API

pub mod migrate;
pub mod serve;
pub mod token;

use clap::{Parser, Subcommand};

use crate::config::AppConfig;
use crate::infrastructure::logging;

/// Repo Summarizer API - GitHub README summaries behind per-key quotas
#[derive(Parser)]
#[command(name = "repo-summarizer-api")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the API server
    Serve,

    /// Apply PostgreSQL schema migrations
    Migrate,

    /// Print a signed owner token
    Token(token::TokenArgs),
}

/// Load `.env`, the layered configuration, and install logging
pub(crate) fn load_config() -> anyhow::Result<AppConfig> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load()?;
    logging::init_logging(&config.logging);

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_token_command() {
        let cli = Cli::parse_from(["repo-summarizer-api", "token", "--owner", "user-1"]);
        match cli.command {
            Command::Token(args) => {
                assert_eq!(args.owner, "user-1");
                assert!(args.hours.is_none());
            }
            _ => panic!("expected token command"),
        }
    }

    #[test]
    fn test_parse_serve_command() {
        let cli = Cli::parse_from(["repo-summarizer-api", "serve"]);
        assert!(matches!(cli.command, Command::Serve));
    }
}
