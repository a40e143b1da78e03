//! Ideabox CLI - database migrations and mail inspection.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations (board tables and session store)
//! ideabox migrate
//!
//! # Print the first link in the latest email sent to an address
//! ideabox mail last-link user@example.com
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "ideabox")]
#[command(author, version, about = "Ideabox CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Inspect mail sent through Mailgun
    Mail {
        #[command(subcommand)]
        action: MailAction,
    },
}

#[derive(Subcommand)]
enum MailAction {
    /// Print the first link of the latest email accepted for an address
    LastLink {
        /// Recipient address, matched exactly
        to: String,

        /// Seconds to wait between polls
        #[arg(long, default_value_t = 2)]
        poll_delay: u64,
    },
}

#[tokio::main]
async fn main() {
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
        Commands::Mail { action } => match action {
            MailAction::LastLink { to, poll_delay } => {
                commands::mail::last_link(&to, poll_delay).await?;
            }
        },
    }
    Ok(())
}
