//! Status command implementation

use std::path::Path;

use anyhow::Result;
use invparse_core::config::{default_config_path, AnalyzerConfig};

use super::open_db;

pub fn cmd_status(db_path: &Path) -> Result<()> {
    println!();
    println!("📊 InvParse Status");
    println!("   ─────────────────────────────────────────────────────────────");

    println!("   Database: {}", db_path.display());

    if db_path.exists() {
        if let Ok(metadata) = std::fs::metadata(db_path) {
            let size_kb = metadata.len() as f64 / 1024.0;
            if size_kb < 1024.0 {
                println!("   Size: {:.1} KB", size_kb);
            } else {
                println!("   Size: {:.1} MB", size_kb / 1024.0);
            }
        }

        match open_db(db_path) {
            Ok(db) => {
                if let Ok(stats) = db.stats() {
                    println!();
                    println!("   Invoices: {}", stats.invoices);
                    println!("   Line items: {}", stats.items);
                }
            }
            Err(e) => {
                println!();
                println!("   ❌ Error opening database: {}", e);
            }
        }
    } else {
        println!("   Size: (database not initialized)");
        println!("      Run 'invparse init' to create it");
    }

    println!();
    match AnalyzerConfig::load() {
        Ok(config) => {
            println!("   Analyzer: {}", config.backend.as_str());
            println!(
                "   Endpoint: {}",
                config.endpoint.as_deref().unwrap_or("(not set)")
            );
            println!("   Timeout: {}s", config.timeout.as_secs());
        }
        Err(e) => println!("   ❌ Analyzer config error: {}", e),
    }
    if let Some(path) = default_config_path() {
        let marker = if path.exists() { "" } else { " (not present)" };
        println!("   Config override: {}{}", path.display(), marker);
    }

    Ok(())
}
