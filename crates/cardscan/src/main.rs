//! Cardscan CLI - extract contact details from business-card images.
//!
//! Cardscan sends each card image to a vision model and collects the contact
//! fields it returns, either into a Google Sheet (cards in a Drive folder) or
//! into a CSV file (cards in a local folder).
//!
//! # Usage
//!
//! ```bash
//! # Drive folder into a Google Sheet
//! cardscan extract drive --folder-id 1AbC... --sheet "Business Card Data Extractor"
//!
//! # Local folder into a CSV file
//! cardscan extract local ./cards --output contacts.csv
//!
//! # Check credentials and remaining quota
//! cardscan check --quota
//!
//! # View configuration
//! cardscan config show
//! ```

use clap::{Parser, Subcommand};

mod cli;
mod logging;

/// Cardscan - business-card contact extraction with a vision model.
#[derive(Parser, Debug)]
#[command(name = "cardscan")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Extract contacts from a folder of card images
    Extract(cli::extract::ExtractArgs),

    /// Verify credentials, source and sink access, or remaining quota
    Check(cli::check::CheckArgs),

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logging isn't initialized yet, so config warnings go through eprintln.
    let config = match cardscan_core::Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Warning: Failed to load config: {e}\n  \
                 Using default configuration. Check your config file with `cardscan config path`."
            );
            cardscan_core::Config::default()
        }
    };
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("Cardscan v{}", cardscan_core::VERSION);

    match cli.command {
        Commands::Extract(args) => cli::extract::execute(args, config).await,
        Commands::Check(args) => cli::check::execute(args, config).await,
        Commands::Config(args) => cli::config::execute(args).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_local_extract() {
        let cli = Cli::parse_from([
            "cardscan", "-v", "extract", "local", "./cards", "--output", "-", "--delay-ms", "0",
        ]);
        assert!(cli.verbose);
        assert!(matches!(cli.command, Commands::Extract(_)));
    }

    #[test]
    fn test_parse_check_quota() {
        let cli = Cli::parse_from(["cardscan", "check", "--quota", "--provider", "openai"]);
        match cli.command {
            Commands::Check(args) => assert!(args.quota),
            other => panic!("expected check, got {other:?}"),
        }
    }
}
