//! Database access layer with connection pooling and migrations
//!
//! This module is organized by domain:
//! - `invoices` - Invoice upsert, lookup and delete (with confidences and items)

use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use tracing::info;

use crate::error::Result;

mod invoices;

pub use invoices::DatabaseStats;

pub type DbPool = Pool<SqliteConnectionManager>;
pub type DbConn = PooledConnection<SqliteConnectionManager>;

/// Database wrapper with connection pooling
#[derive(Clone)]
pub struct Database {
    pool: DbPool,
    /// Path to the database file
    db_path: String,
}

impl Database {
    /// Open (and migrate) the database at `path`
    pub fn new(path: &str) -> Result<Self> {
        // Foreign keys are per-connection in SQLite
        let manager = SqliteConnectionManager::file(path).with_init(|conn| {
            conn.execute_batch("PRAGMA foreign_keys = ON;")?;
            Ok(())
        });

        let pool = Pool::builder().max_size(10).build(manager)?;

        let db = Self {
            pool,
            db_path: path.to_string(),
        };
        db.run_migrations()?;

        Ok(db)
    }

    /// Get the path to the database file
    pub fn path(&self) -> &str {
        &self.db_path
    }

    /// Create an in-memory database (for testing)
    ///
    /// Note: Uses a temporary file rather than `:memory:` because every pooled
    /// connection to `:memory:` would see its own empty database.
    pub fn in_memory() -> Result<Self> {
        use std::sync::atomic::{AtomicU64, Ordering};
        static COUNTER: AtomicU64 = AtomicU64::new(0);

        let id = COUNTER.fetch_add(1, Ordering::SeqCst);
        let path = std::env::temp_dir().join(format!(
            "invparse_test_{}_{}.db",
            std::process::id(),
            id
        ));

        // Remove any existing file
        let _ = std::fs::remove_file(&path);

        Self::new(&path.to_string_lossy())
    }

    /// Get a connection from the pool
    pub fn conn(&self) -> Result<DbConn> {
        Ok(self.pool.get()?)
    }

    /// Run database migrations
    fn run_migrations(&self) -> Result<()> {
        let conn = self.conn()?;

        conn.execute_batch(
            r#"
            -- WAL mode: readers don't block the upsert writer
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;

            -- Extracted invoice header fields
            CREATE TABLE IF NOT EXISTS invoices (
                InvoiceId TEXT PRIMARY KEY,
                VendorName TEXT,
                InvoiceDate TEXT,
                BillingAddressRecipient TEXT,
                ShippingAddress TEXT,
                SubTotal REAL,
                ShippingCost REAL,
                InvoiceTotal REAL
            );

            CREATE INDEX IF NOT EXISTS idx_invoices_vendor ON invoices(VendorName);

            -- Label confidence for each header field
            CREATE TABLE IF NOT EXISTS confidences (
                InvoiceId TEXT PRIMARY KEY
                    REFERENCES invoices(InvoiceId) ON DELETE CASCADE,
                VendorName REAL,
                InvoiceDate REAL,
                BillingAddressRecipient REAL,
                ShippingAddress REAL,
                SubTotal REAL,
                ShippingCost REAL,
                InvoiceTotal REAL
            );

            -- Line items, replaced wholesale on every save
            CREATE TABLE IF NOT EXISTS items (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                InvoiceId TEXT NOT NULL
                    REFERENCES invoices(InvoiceId) ON DELETE CASCADE,
                Description TEXT,
                Name TEXT,
                Quantity REAL,
                UnitPrice REAL,
                Amount REAL
            );

            CREATE INDEX IF NOT EXISTS idx_items_invoice ON items(InvoiceId);
            "#,
        )?;

        info!("Database schema initialized");
        Ok(())
    }
}
