//! Newsdesk CLI - Database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Run schema and session-store migrations
//! newsdesk migrate
//!
//! # Load articles and tags from a JSON file
//! newsdesk seed --file news.json
//!
//! # Fetch recent news for every stored tag
//! newsdesk ingest
//!
//! # Look a user up
//! newsdesk user show --email reader@example.com
//! newsdesk user show --external-id 1234567890
//! ```
//!
//! # Environment Variables
//!
//! - `POSTGRES_CONN_STR` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//! - `NEWSAPI_KEY` - News API key (`ingest` only)
//! - `NEWSAPI_URL`, `NEWSAPI_LOOKBACK_DAYS`, `NEWSAPI_PAGE_SIZE` - optional `ingest` tuning

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "newsdesk")]
#[command(author, version, about = "Newsdesk CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations (schema and session store)
    Migrate,
    /// Load articles and tags from a JSON seed file
    Seed {
        /// Path to the seed file
        #[arg(short, long)]
        file: PathBuf,
    },
    /// Fetch recent news for every stored tag
    Ingest,
    /// Inspect users
    User {
        #[command(subcommand)]
        action: UserAction,
    },
}

#[derive(Subcommand)]
enum UserAction {
    /// Show one user as JSON
    Show(UserLookup),
}

#[derive(Args)]
#[group(required = true, multiple = false)]
struct UserLookup {
    /// Look up by email address
    #[arg(short, long)]
    email: Option<String>,

    /// Look up by the identity provider's subject identifier
    #[arg(short = 'x', long)]
    external_id: Option<String>,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Seed { file } => commands::seed::run(&file).await?,
        Commands::Ingest => commands::ingest::run().await?,
        Commands::User { action } => match action {
            UserAction::Show(lookup) => {
                let key = match (lookup.email, lookup.external_id) {
                    (Some(email), _) => commands::user::Lookup::Email(email),
                    (None, Some(id)) => commands::user::Lookup::ExternalId(id),
                    (None, None) => {
                        return Err("either --email or --external-id is required".into());
                    }
                };
                commands::user::show(key).await?;
            }
        },
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_ingest_takes_no_arguments() {
        let cli = Cli::try_parse_from(["newsdesk", "ingest"]).unwrap();
        assert!(matches!(cli.command, Commands::Ingest));
        assert!(Cli::try_parse_from(["newsdesk", "ingest", "--file", "x.json"]).is_err());
    }

    #[test]
    fn test_user_show_requires_exactly_one_key() {
        assert!(Cli::try_parse_from(["newsdesk", "user", "show"]).is_err());
        assert!(
            Cli::try_parse_from(["newsdesk", "user", "show", "--email", "a@b.c", "-x", "1"])
                .is_err()
        );
        assert!(Cli::try_parse_from(["newsdesk", "user", "show", "--external-id", "1"]).is_ok());
    }
}
