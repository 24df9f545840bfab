//! Invoice operations

use rusqlite::{params, OptionalExtension};
use serde::Serialize;
use tracing::debug;

use super::Database;
use crate::error::Result;
use crate::extract::FieldMap;
use crate::models::{Invoice, InvoiceConfidence, InvoiceItem, NewInvoice};

const INVOICE_COLUMNS: &str = "InvoiceId, VendorName, InvoiceDate, BillingAddressRecipient,
     ShippingAddress, SubTotal, ShippingCost, InvoiceTotal";

/// Row counts for status reporting
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DatabaseStats {
    pub invoices: i64,
    pub items: i64,
}

impl Database {
    /// Save an extraction's fields and confidences.
    ///
    /// Returns the invoice ID written, or `None` when the fields carry no
    /// usable `InvoiceId` (nothing is written in that case).
    pub fn save_extraction(
        &self,
        fields: &FieldMap,
        confidences: &FieldMap,
    ) -> Result<Option<String>> {
        match NewInvoice::from_fields(fields, confidences) {
            Some(invoice) => {
                self.upsert_invoice(&invoice)?;
                Ok(Some(invoice.invoice_id))
            }
            None => {
                debug!("No InvoiceId in extraction, nothing to save");
                Ok(None)
            }
        }
    }

    /// Insert or fully replace an invoice, its confidences and its items.
    ///
    /// Runs in a single transaction. Existing items for the invoice are
    /// deleted before the new set is inserted.
    pub fn upsert_invoice(&self, invoice: &NewInvoice) -> Result<()> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        tx.execute(
            "INSERT INTO invoices (InvoiceId, VendorName, InvoiceDate, BillingAddressRecipient,
             ShippingAddress, SubTotal, ShippingCost, InvoiceTotal)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT(InvoiceId) DO UPDATE SET
                VendorName = excluded.VendorName,
                InvoiceDate = excluded.InvoiceDate,
                BillingAddressRecipient = excluded.BillingAddressRecipient,
                ShippingAddress = excluded.ShippingAddress,
                SubTotal = excluded.SubTotal,
                ShippingCost = excluded.ShippingCost,
                InvoiceTotal = excluded.InvoiceTotal",
            params![
                invoice.invoice_id,
                invoice.vendor_name,
                invoice.invoice_date,
                invoice.billing_address_recipient,
                invoice.shipping_address,
                invoice.sub_total,
                invoice.shipping_cost,
                invoice.invoice_total,
            ],
        )?;

        let c = &invoice.confidence;
        tx.execute(
            "INSERT INTO confidences (InvoiceId, VendorName, InvoiceDate, BillingAddressRecipient,
             ShippingAddress, SubTotal, ShippingCost, InvoiceTotal)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT(InvoiceId) DO UPDATE SET
                VendorName = excluded.VendorName,
                InvoiceDate = excluded.InvoiceDate,
                BillingAddressRecipient = excluded.BillingAddressRecipient,
                ShippingAddress = excluded.ShippingAddress,
                SubTotal = excluded.SubTotal,
                ShippingCost = excluded.ShippingCost,
                InvoiceTotal = excluded.InvoiceTotal",
            params![
                invoice.invoice_id,
                c.vendor_name,
                c.invoice_date,
                c.billing_address_recipient,
                c.shipping_address,
                c.sub_total,
                c.shipping_cost,
                c.invoice_total,
            ],
        )?;

        let removed = tx.execute(
            "DELETE FROM items WHERE InvoiceId = ?",
            params![invoice.invoice_id],
        )?;

        {
            let mut stmt = tx.prepare(
                "INSERT INTO items (InvoiceId, Description, Name, Quantity, UnitPrice, Amount)
                 VALUES (?, ?, ?, ?, ?, ?)",
            )?;
            for item in &invoice.items {
                stmt.execute(params![
                    invoice.invoice_id,
                    item.description,
                    item.name,
                    item.quantity,
                    item.unit_price,
                    item.amount,
                ])?;
            }
        }

        tx.commit()?;

        debug!(
            invoice_id = %invoice.invoice_id,
            items_removed = removed,
            items_inserted = invoice.items.len(),
            "Invoice saved"
        );
        Ok(())
    }

    /// Get an invoice with its items
    pub fn get_invoice(&self, invoice_id: &str) -> Result<Option<Invoice>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM invoices WHERE InvoiceId = ?",
            INVOICE_COLUMNS
        ))?;

        let invoice = stmt
            .query_row(params![invoice_id], |row| Self::row_to_invoice(row))
            .optional()?;

        match invoice {
            Some(mut invoice) => {
                invoice.items = self.get_invoice_items(invoice_id)?;
                Ok(Some(invoice))
            }
            None => Ok(None),
        }
    }

    /// Get all invoices for a vendor (exact name match)
    pub fn get_invoices_by_vendor(&self, vendor_name: &str) -> Result<Vec<Invoice>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM invoices WHERE VendorName = ? ORDER BY InvoiceId",
            INVOICE_COLUMNS
        ))?;

        let mut invoices = stmt
            .query_map(params![vendor_name], |row| Self::row_to_invoice(row))?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        for invoice in &mut invoices {
            invoice.items = self.get_invoice_items(&invoice.invoice_id)?;
        }

        Ok(invoices)
    }

    /// Get line items for an invoice, in insertion order
    pub fn get_invoice_items(&self, invoice_id: &str) -> Result<Vec<InvoiceItem>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT Description, Name, Quantity, UnitPrice, Amount
             FROM items WHERE InvoiceId = ? ORDER BY id",
        )?;

        let items = stmt
            .query_map(params![invoice_id], |row| {
                Ok(InvoiceItem {
                    description: row.get(0)?,
                    name: row.get(1)?,
                    quantity: row.get(2)?,
                    unit_price: row.get(3)?,
                    amount: row.get(4)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(items)
    }

    /// Get stored field confidences for an invoice
    pub fn get_confidences(&self, invoice_id: &str) -> Result<Option<InvoiceConfidence>> {
        let conn = self.conn()?;
        let confidence = conn
            .query_row(
                "SELECT VendorName, InvoiceDate, BillingAddressRecipient, ShippingAddress,
                        SubTotal, ShippingCost, InvoiceTotal
                 FROM confidences WHERE InvoiceId = ?",
                params![invoice_id],
                |row| {
                    Ok(InvoiceConfidence {
                        vendor_name: row.get(0)?,
                        invoice_date: row.get(1)?,
                        billing_address_recipient: row.get(2)?,
                        shipping_address: row.get(3)?,
                        sub_total: row.get(4)?,
                        shipping_cost: row.get(5)?,
                        invoice_total: row.get(6)?,
                    })
                },
            )
            .optional()?;

        Ok(confidence)
    }

    /// Delete an invoice. Confidences and items go with it.
    ///
    /// Returns false if the invoice did not exist.
    pub fn delete_invoice(&self, invoice_id: &str) -> Result<bool> {
        let conn = self.conn()?;
        let deleted = conn.execute(
            "DELETE FROM invoices WHERE InvoiceId = ?",
            params![invoice_id],
        )?;
        Ok(deleted > 0)
    }

    /// Count stored invoices and items
    pub fn stats(&self) -> Result<DatabaseStats> {
        let conn = self.conn()?;
        let invoices = conn.query_row("SELECT COUNT(*) FROM invoices", [], |row| row.get(0))?;
        let items = conn.query_row("SELECT COUNT(*) FROM items", [], |row| row.get(0))?;
        Ok(DatabaseStats { invoices, items })
    }

    /// Helper to convert a row to Invoice (items loaded separately)
    fn row_to_invoice(row: &rusqlite::Row) -> rusqlite::Result<Invoice> {
        Ok(Invoice {
            invoice_id: row.get(0)?,
            vendor_name: row.get(1)?,
            invoice_date: row.get(2)?,
            billing_address_recipient: row.get(3)?,
            shipping_address: row.get(4)?,
            sub_total: row.get(5)?,
            shipping_cost: row.get(6)?,
            invoice_total: row.get(7)?,
            items: Vec::new(),
        })
    }
}
