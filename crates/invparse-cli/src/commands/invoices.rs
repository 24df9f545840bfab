//! Stored invoice commands (show, vendor, delete)

use anyhow::{bail, Context, Result};
use invparse_core::db::Database;
use invparse_core::models::VendorInvoices;

pub fn cmd_show(db: &Database, invoice_id: &str) -> Result<()> {
    let invoice = db
        .get_invoice(invoice_id)?
        .with_context(|| format!("Invoice not found: {}", invoice_id))?;

    println!("{}", serde_json::to_string_pretty(&invoice)?);
    Ok(())
}

pub fn cmd_vendor(db: &Database, vendor_name: &str) -> Result<()> {
    let invoices = db.get_invoices_by_vendor(vendor_name)?;
    let response = VendorInvoices::new(vendor_name, invoices);

    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}

pub fn cmd_delete(db: &Database, invoice_id: &str) -> Result<()> {
    if !db.delete_invoice(invoice_id)? {
        bail!("Invoice not found: {}", invoice_id);
    }

    println!("🗑️  Deleted invoice {}", invoice_id);
    Ok(())
}
