//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// InvParse - Extract structured data from PDF invoices
#[derive(Parser)]
#[command(name = "invparse")]
#[command(about = "Invoice extraction service with confidence gating", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Database path
    #[arg(long, default_value = "invoices.db", global = true)]
    pub db: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database
    Init,

    /// Start the web server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "8000")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Disable authentication (for local development only)
        ///
        /// WARNING: Do not use this flag when exposing the server to a network.
        /// By default, requests must carry a key from INVPARSE_API_KEYS.
        #[arg(long)]
        no_auth: bool,
    },

    /// Extract an invoice from a local PDF and print the result as JSON
    Extract {
        /// PDF file to analyze
        #[arg(short, long)]
        file: PathBuf,

        /// Do not store the accepted invoice
        #[arg(long)]
        no_save: bool,
    },

    /// Show a stored invoice
    Show {
        /// Invoice ID
        id: String,
    },

    /// List stored invoices for a vendor
    Vendor {
        /// Vendor name (exact match)
        name: String,
    },

    /// Delete a stored invoice with its confidences and items
    Delete {
        /// Invoice ID
        id: String,
    },

    /// Show database and analyzer status
    Status,
}
