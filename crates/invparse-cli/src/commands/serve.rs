//! Server command implementation

use std::path::Path;

use anyhow::{Context, Result};
use invparse_core::{AnalyzerClient, DocumentAnalyzer};

use super::open_db;

/// Environment variable holding accepted API keys (comma-separated)
pub const API_KEYS_ENV: &str = "INVPARSE_API_KEYS";

pub async fn cmd_serve(db_path: &Path, host: &str, port: u16, no_auth: bool) -> Result<()> {
    println!("🚀 Starting InvParse web server...");
    println!("   Database: {}", db_path.display());
    println!("   Listening: http://{}:{}", host, port);

    // Parse API keys from environment (comma-separated)
    let api_keys =
        invparse_server::parse_api_keys(&std::env::var(API_KEYS_ENV).unwrap_or_default());

    if no_auth {
        println!();
        println!("   ⚠️  Authentication DISABLED - do not expose to network!");
    } else if api_keys.is_empty() {
        println!("   ❌ Authentication required but {} is not set", API_KEYS_ENV);
        println!("      Every API request will be rejected. Set keys or use --no-auth.");
    } else {
        println!(
            "   🔑 API keys: {} configured ({})",
            api_keys.len(),
            API_KEYS_ENV
        );
    }

    let analyzer = AnalyzerClient::from_env().context("Failed to configure document analyzer")?;
    println!(
        "   Analyzer: {} ({})",
        analyzer.backend_name(),
        analyzer.host()
    );
    println!();
    println!("   Press Ctrl+C to stop");

    let db = open_db(db_path)?;

    let config = invparse_server::ServerConfig {
        require_auth: !no_auth,
        allowed_origins: vec![],
        api_keys,
    };

    invparse_server::serve_with_config(db, analyzer, host, port, config).await?;

    Ok(())
}
