//! CLI command tests
//!
//! This module contains all tests for the CLI commands.

use std::io::Write;

use invparse_core::analysis::{sample_invoice, DetectedDocumentType, RawAnalysisResult};
use invparse_core::db::Database;
use invparse_core::{AnalyzerClient, InvoicePipeline, MockAnalyzer};
use serde_json::json;
use tempfile::{NamedTempFile, TempDir};

use crate::commands;

fn setup_test_db() -> Database {
    Database::in_memory().unwrap()
}

fn pdf_file(content: &[u8]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content).unwrap();
    file
}

fn seed_invoice(db: &Database, id: &str, vendor: &str) {
    let fields = json!({
        "InvoiceId": id,
        "VendorName": vendor,
        "Items": [{ "Description": "Widget", "Amount": 5.0 }]
    });
    db.save_extraction(fields.as_object().unwrap(), &Default::default())
        .unwrap();
}

// ========== Core Command Tests ==========

#[test]
fn test_cmd_init_creates_schema() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("invoices.db");

    commands::cmd_init(&db_path).unwrap();

    assert!(db_path.exists());
    let conn = rusqlite::Connection::open(&db_path).unwrap();
    let tables: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name IN ('invoices', 'confidences', 'items')",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(tables, 3);
}

#[test]
fn test_cmd_init_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("invoices.db");

    commands::cmd_init(&db_path).unwrap();
    let db = commands::open_db(&db_path).unwrap();
    seed_invoice(&db, "KEEP-1", "Acme");
    drop(db);

    commands::cmd_init(&db_path).unwrap();

    let db = commands::open_db(&db_path).unwrap();
    assert!(db.get_invoice("KEEP-1").unwrap().is_some());
}

#[test]
fn test_cmd_status() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("invoices.db");

    // Works before and after init
    assert!(commands::cmd_status(&db_path).is_ok());
    commands::cmd_init(&db_path).unwrap();
    assert!(commands::cmd_status(&db_path).is_ok());
}

// ========== Invoice Command Tests ==========

#[test]
fn test_cmd_show() {
    let db = setup_test_db();
    seed_invoice(&db, "INV-1", "Acme");

    assert!(commands::cmd_show(&db, "INV-1").is_ok());
}

#[test]
fn test_cmd_show_not_found() {
    let db = setup_test_db();

    let err = commands::cmd_show(&db, "missing").unwrap_err();
    assert!(err.to_string().contains("Invoice not found"));
}

#[test]
fn test_cmd_vendor_empty_is_ok() {
    let db = setup_test_db();
    assert!(commands::cmd_vendor(&db, "Nobody").is_ok());
}

#[test]
fn test_cmd_delete() {
    let db = setup_test_db();
    seed_invoice(&db, "INV-1", "Acme");

    commands::cmd_delete(&db, "INV-1").unwrap();

    assert!(db.get_invoice("INV-1").unwrap().is_none());
    assert!(commands::cmd_delete(&db, "INV-1").is_err());
}

// ========== Extract Command Tests ==========

#[tokio::test]
async fn test_extract_file_stores_invoice() {
    let db = setup_test_db();
    let pipeline = InvoicePipeline::new(AnalyzerClient::mock(sample_invoice()), db.clone());
    let file = pdf_file(b"%PDF-1.4 test");

    let outcome = commands::extract_file(&pipeline, file.path()).await.unwrap();

    assert_eq!(outcome.saved_invoice_id.as_deref(), Some("36259"));
    assert!(db.get_invoice("36259").unwrap().is_some());
}

#[tokio::test]
async fn test_extract_file_no_save() {
    let mock = MockAnalyzer::invoice();
    let pipeline = InvoicePipeline::without_storage(AnalyzerClient::Mock(mock.clone()));
    let file = pdf_file(b"%PDF-1.4 test");

    let outcome = commands::extract_file(&pipeline, file.path()).await.unwrap();

    assert!(outcome.saved_invoice_id.is_none());
    assert_eq!(mock.calls(), 1);
}

#[tokio::test]
async fn test_extract_file_low_confidence() {
    let raw = RawAnalysisResult::new(vec![DetectedDocumentType::new("INVOICE", 0.4)], vec![]);
    let pipeline = InvoicePipeline::without_storage(AnalyzerClient::mock(raw));
    let file = pdf_file(b"%PDF-1.4 test");

    let err = commands::extract_file(&pipeline, file.path())
        .await
        .unwrap_err();

    assert!(err.to_string().contains("Invalid document"));
}

#[tokio::test]
async fn test_extract_file_remote_failure() {
    let pipeline = InvoicePipeline::without_storage(AnalyzerClient::failing());
    let file = pdf_file(b"%PDF-1.4 test");

    let err = commands::extract_file(&pipeline, file.path())
        .await
        .unwrap_err();

    assert!(err.to_string().contains("unavailable"));
}

#[tokio::test]
async fn test_extract_file_empty_or_missing() {
    let mock = MockAnalyzer::invoice();
    let pipeline = InvoicePipeline::without_storage(AnalyzerClient::Mock(mock.clone()));

    let empty = pdf_file(b"");
    assert!(commands::extract_file(&pipeline, empty.path()).await.is_err());

    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("nope.pdf");
    assert!(commands::extract_file(&pipeline, &missing).await.is_err());

    assert_eq!(mock.calls(), 0);
}
