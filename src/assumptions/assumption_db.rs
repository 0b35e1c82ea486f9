//! Assumption database with SQLite backend

use super::store::{AssumptionRow, AssumptionStore};
use super::{AssumptionKey, AssumptionRecord};
use crate::error::{Result, ValuationError};
use rusqlite::{params, Connection, OpenFlags, OptionalExtension, Row};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

const SELECT_COLUMNS: &str = "model_key, industry, size_bucket, growth_bucket, revenue_multiple, ebitda_multiple, earnings_multiple, discount_rate, terminal_multiple, net_debt_method, net_debt_k, net_debt_direct";

/// Assumption store backed by a SQLite table
///
/// Generic dimensions are stored as NULL. Lookups compare with `IS` so a
/// `None` key dimension only matches a NULL column.
///
/// Writes go through a single connection. Lookups check out a connection
/// from a reader pool and run without holding any lock, so concurrent
/// resolutions for different models do not wait on each other.
pub struct AssumptionDB {
    conn: Mutex<Connection>,
    readers: Mutex<Vec<Connection>>,
    reader_target: PathBuf,
    reader_flags: OpenFlags,
    location: Option<PathBuf>,
}

impl AssumptionDB {
    /// Create or open database at path
    pub fn new(db_path: &Path) -> Result<Self> {
        let conn = Connection::open(db_path)
            .map_err(|e| ValuationError::StoreError(format!("Failed to open database: {}", e)))?;

        let db = Self {
            conn: Mutex::new(conn),
            readers: Mutex::new(Vec::new()),
            reader_target: db_path.to_path_buf(),
            reader_flags: OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
            location: Some(db_path.to_path_buf()),
        };
        db.create_tables()?;
        Ok(db)
    }

    /// Create in-memory database (for testing)
    ///
    /// Uses a uniquely named shared-cache database so pooled readers see the
    /// same tables as the writer. The data lives as long as the writer.
    pub fn new_in_memory() -> Result<Self> {
        let uri = format!("file:valuation-assumptions-{}?mode=memory&cache=shared", Uuid::new_v4());
        let conn = Connection::open_with_flags(
            &uri,
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_CREATE
                | OpenFlags::SQLITE_OPEN_URI
                | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|e| {
            ValuationError::StoreError(format!("Failed to create in-memory database: {}", e))
        })?;

        let db = Self {
            conn: Mutex::new(conn),
            readers: Mutex::new(Vec::new()),
            reader_target: PathBuf::from(uri),
            reader_flags: OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_URI
                | OpenFlags::SQLITE_OPEN_NO_MUTEX,
            location: None,
        };
        db.create_tables()?;
        Ok(db)
    }

    fn connection(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| ValuationError::StoreError("Assumption database lock poisoned".to_string()))
    }

    /// Run a read query on a pooled connection
    ///
    /// The pool lock is held only to take and return a connection.
    fn with_reader<T>(&self, query: impl FnOnce(&Connection) -> Result<T>) -> Result<T> {
        let pooled = self
            .readers
            .lock()
            .map_err(|_| ValuationError::StoreError("Reader pool lock poisoned".to_string()))?
            .pop();
        let conn = match pooled {
            Some(conn) => conn,
            None => Connection::open_with_flags(&self.reader_target, self.reader_flags).map_err(
                |e| ValuationError::StoreError(format!("Failed to open reader connection: {}", e)),
            )?,
        };

        let result = query(&conn);

        if let Ok(mut pool) = self.readers.lock() {
            pool.push(conn);
        }
        result
    }

    /// Number of idle pooled reader connections
    pub fn idle_readers(&self) -> usize {
        self.readers.lock().map(|pool| pool.len()).unwrap_or(0)
    }

    /// Create database tables
    pub fn create_tables(&self) -> Result<()> {
        let conn = self.connection()?;
        conn.execute(
            "CREATE TABLE IF NOT EXISTS valuation_assumptions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                model_key TEXT NOT NULL,
                industry TEXT,
                size_bucket TEXT,
                growth_bucket TEXT,
                revenue_multiple REAL,
                ebitda_multiple REAL,
                earnings_multiple REAL,
                discount_rate REAL,
                terminal_multiple REAL,
                net_debt_method TEXT,
                net_debt_k REAL,
                net_debt_direct REAL
            )",
            [],
        )
        .map_err(|e| ValuationError::StoreError(format!("Failed to create assumptions table: {}", e)))?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_assumption_lookup
             ON valuation_assumptions(model_key, industry, size_bucket, growth_bucket)",
            [],
        )
        .map_err(|e| ValuationError::StoreError(format!("Failed to create lookup index: {}", e)))?;

        Ok(())
    }

    fn row_to_assumption(row: &Row<'_>) -> rusqlite::Result<AssumptionRow> {
        Ok(AssumptionRow {
            model_key: row.get(0)?,
            industry: row.get(1)?,
            size_bucket: row.get(2)?,
            growth_bucket: row.get(3)?,
            revenue_multiple: row.get(4)?,
            ebitda_multiple: row.get(5)?,
            earnings_multiple: row.get(6)?,
            discount_rate: row.get(7)?,
            terminal_multiple: row.get(8)?,
            net_debt_method: row.get(9)?,
            net_debt_k: row.get(10)?,
            net_debt_direct: row.get(11)?,
        })
    }

    /// Insert a row, replacing any row with the same key
    pub fn upsert(&self, key: &AssumptionKey, record: &AssumptionRecord) -> Result<()> {
        let row = AssumptionRow::from_entry(key, record);
        let mut conn = self.connection()?;
        let tx = conn.transaction()?;

        tx.execute(
            "DELETE FROM valuation_assumptions
             WHERE model_key = ?1 AND industry IS ?2 AND size_bucket IS ?3 AND growth_bucket IS ?4",
            params![&row.model_key, &row.industry, &row.size_bucket, &row.growth_bucket],
        )?;
        tx.execute(
            "INSERT INTO valuation_assumptions (model_key, industry, size_bucket, growth_bucket,
                revenue_multiple, ebitda_multiple, earnings_multiple, discount_rate, terminal_multiple,
                net_debt_method, net_debt_k, net_debt_direct)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            params![
                &row.model_key,
                &row.industry,
                &row.size_bucket,
                &row.growth_bucket,
                row.revenue_multiple,
                row.ebitda_multiple,
                row.earnings_multiple,
                row.discount_rate,
                row.terminal_multiple,
                &row.net_debt_method,
                row.net_debt_k,
                row.net_debt_direct,
            ],
        )?;
        tx.commit()?;

        Ok(())
    }

    /// Import flat rows (e.g. from CSV); returns the number of rows written
    pub fn import_rows(&self, rows: Vec<AssumptionRow>) -> Result<usize> {
        let mut count = 0;
        for row in rows {
            let (key, record) = row.into_entry()?;
            self.upsert(&key, &record)?;
            count += 1;
        }
        Ok(count)
    }

    /// Delete the row for a key; returns whether one existed
    pub fn delete(&self, key: &AssumptionKey) -> Result<bool> {
        let row = AssumptionRow::from_entry(key, &AssumptionRecord::default());
        let conn = self.connection()?;
        let deleted = conn.execute(
            "DELETE FROM valuation_assumptions
             WHERE model_key = ?1 AND industry IS ?2 AND size_bucket IS ?3 AND growth_bucket IS ?4",
            params![&row.model_key, &row.industry, &row.size_bucket, &row.growth_bucket],
        )?;
        Ok(deleted > 0)
    }

    /// All rows, optionally for one model
    pub fn list(&self, model_key: Option<&str>) -> Result<Vec<AssumptionRow>> {
        let conn = self.connection()?;
        let query = format!(
            "SELECT {} FROM valuation_assumptions
             WHERE ?1 IS NULL OR model_key = ?1
             ORDER BY model_key, industry, size_bucket, growth_bucket",
            SELECT_COLUMNS
        );
        let mut stmt = conn.prepare(&query)?;
        let rows = stmt
            .query_map(params![model_key], Self::row_to_assumption)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Get row count
    pub fn count(&self) -> Result<usize> {
        let conn = self.connection()?;
        let count: i64 =
            conn.query_row("SELECT COUNT(*) FROM valuation_assumptions", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

impl AssumptionStore for AssumptionDB {
    fn lookup(&self, key: &AssumptionKey) -> Result<Option<AssumptionRecord>> {
        let wanted = AssumptionRow::from_entry(key, &AssumptionRecord::default());
        let query = format!(
            "SELECT {} FROM valuation_assumptions
             WHERE model_key = ?1 AND industry IS ?2 AND size_bucket IS ?3 AND growth_bucket IS ?4
             ORDER BY id DESC LIMIT 1",
            SELECT_COLUMNS
        );
        let row = self.with_reader(|conn| {
            Ok(conn
                .query_row(
                    &query,
                    params![&wanted.model_key, &wanted.industry, &wanted.size_bucket, &wanted.growth_bucket],
                    Self::row_to_assumption,
                )
                .optional()?)
        })?;

        match row {
            Some(row) => {
                let (_, record) = row.into_entry()?;
                Ok(Some(record))
            }
            None => Ok(None),
        }
    }

    fn describe(&self) -> String {
        match &self.location {
            Some(path) => format!("sqlite store at {}", path.display()),
            None => "in-memory sqlite store".to_string(),
        }
    }
}
