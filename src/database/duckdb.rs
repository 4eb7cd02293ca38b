//! DuckDB sink
//!
//! Executes statements against an embedded DuckDB database inside a real
//! transaction.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::{DatabaseError, DatabaseResult, StatementSink, max_key_sql};

/// DuckDB statement sink
///
/// Supports both file-based persistence and in-memory mode.
pub struct DuckDBSink {
    /// Path to the database file (None for in-memory)
    db_path: Option<PathBuf>,
    connection: duckdb::Connection,
}

impl DuckDBSink {
    /// Open (or create) a file-based database
    ///
    /// # Arguments
    /// * `db_path` - Path to the DuckDB database file
    pub fn open(db_path: impl AsRef<Path>) -> DatabaseResult<Self> {
        let path = db_path.as_ref().to_path_buf();
        let connection = duckdb::Connection::open(&path).map_err(|e| {
            DatabaseError::ConnectionFailed(format!("Failed to open DuckDB: {}", e))
        })?;
        info!("Opened DuckDB database {}", path.display());

        Ok(Self {
            db_path: Some(path),
            connection,
        })
    }

    /// Create an in-memory database
    pub fn in_memory() -> DatabaseResult<Self> {
        let connection = duckdb::Connection::open_in_memory().map_err(|e| {
            DatabaseError::ConnectionFailed(format!("Failed to create in-memory DuckDB: {}", e))
        })?;

        Ok(Self {
            db_path: None,
            connection,
        })
    }

    /// Get the database file path (None for in-memory)
    pub fn db_path(&self) -> Option<&Path> {
        self.db_path.as_deref()
    }

    /// Underlying connection, for reading back loaded data
    pub fn connection(&self) -> &duckdb::Connection {
        &self.connection
    }

    fn control(&self, sql: &str) -> DatabaseResult<()> {
        debug!("DuckDB: {}", sql);
        self.connection
            .execute_batch(sql)
            .map_err(|e| DatabaseError::TransactionFailed(format!("{}: {}", sql, e)))
    }
}

impl StatementSink for DuckDBSink {
    fn begin(&mut self) -> DatabaseResult<()> {
        self.control("BEGIN TRANSACTION;")
    }

    fn run(&mut self, statement: &str) -> DatabaseResult<()> {
        self.connection
            .execute_batch(statement)
            .map_err(|e| DatabaseError::statement_failed(statement, e))
    }

    fn end(&mut self) -> DatabaseResult<()> {
        self.control("COMMIT;")
    }

    fn rollback(&mut self) -> DatabaseResult<()> {
        self.control("ROLLBACK;")
    }

    fn last_key(&mut self, table: &str, key_column: &str) -> DatabaseResult<Option<u64>> {
        let sql = max_key_sql(table, key_column);
        let last: Option<i64> = self
            .connection
            .query_row(&sql, [], |row| row.get(0))
            .map_err(|e| DatabaseError::statement_failed(&sql, e))?;
        debug!("DuckDB: {} = {:?}", sql, last);
        Ok(last.map(|key| key.max(0) as u64))
    }

    fn name(&self) -> &'static str {
        "duckdb"
    }
}
