//! InvParse CLI - Invoice extraction with confidence gating
//!
//! Usage:
//!   invparse init                   Initialize database
//!   invparse extract --file PDF     Extract (and store) an invoice
//!   invparse show <id>              Show a stored invoice
//!   invparse serve --port 8000      Start web server

mod cli;
mod commands;

#[cfg(test)]
mod tests;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    match cli.command {
        Commands::Init => commands::cmd_init(&cli.db),
        Commands::Serve {
            port,
            host,
            no_auth,
        } => commands::cmd_serve(&cli.db, &host, port, no_auth).await,
        Commands::Extract { file, no_save } => {
            commands::cmd_extract(&cli.db, &file, no_save).await
        }
        Commands::Show { id } => {
            let db = commands::open_db(&cli.db)?;
            commands::cmd_show(&db, &id)
        }
        Commands::Vendor { name } => {
            let db = commands::open_db(&cli.db)?;
            commands::cmd_vendor(&db, &name)
        }
        Commands::Delete { id } => {
            let db = commands::open_db(&cli.db)?;
            commands::cmd_delete(&db, &id)
        }
        Commands::Status => commands::cmd_status(&cli.db),
    }
}
