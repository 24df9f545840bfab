//! HTTP request handlers organized by domain
//!
//! Each submodule contains handlers for a specific API area.

pub mod extract;
pub mod health;
pub mod invoices;

// Re-export all handlers for use in router
pub use extract::*;
pub use health::*;
pub use invoices::*;
