//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `core` - Core commands (init) and shared utilities (open_db)
//! - `extract` - Run the extraction pipeline on a local PDF
//! - `invoices` - Stored invoice commands (show, vendor, delete)
//! - `serve` - Web server command
//! - `status` - Database and analyzer status

pub mod core;
pub mod extract;
pub mod invoices;
pub mod serve;
pub mod status;

// Re-export command functions for main.rs
pub use core::*;
pub use extract::*;
pub use invoices::*;
pub use serve::*;
pub use status::*;
