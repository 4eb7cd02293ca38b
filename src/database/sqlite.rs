//! SQLite sink
//!
//! Executes statements against a SQLite database file. Durability is traded
//! for load speed: `synchronous` is switched off when the transaction opens.

use std::path::{Path, PathBuf};

use rusqlite::Connection;
use tracing::{debug, info};

use super::{DatabaseError, DatabaseResult, StatementSink, max_key_sql};

/// SQLite statement sink
pub struct SqliteSink {
    db_path: Option<PathBuf>,
    connection: Connection,
}

impl SqliteSink {
    /// Open (or create) a database file
    pub fn open(db_path: impl AsRef<Path>) -> DatabaseResult<Self> {
        let path = db_path.as_ref().to_path_buf();
        let connection = Connection::open(&path).map_err(|e| {
            DatabaseError::ConnectionFailed(format!(
                "Failed to open SQLite database {}: {}",
                path.display(),
                e
            ))
        })?;
        info!("Opened SQLite database {}", path.display());

        Ok(Self {
            db_path: Some(path),
            connection,
        })
    }

    /// Create an in-memory database
    pub fn in_memory() -> DatabaseResult<Self> {
        let connection = Connection::open_in_memory().map_err(|e| {
            DatabaseError::ConnectionFailed(format!("Failed to create in-memory SQLite: {}", e))
        })?;

        Ok(Self {
            db_path: None,
            connection,
        })
    }

    pub fn db_path(&self) -> Option<&Path> {
        self.db_path.as_deref()
    }

    /// Underlying connection, for reading back loaded data
    pub fn connection(&self) -> &Connection {
        &self.connection
    }

    fn control(&self, sql: &str) -> DatabaseResult<()> {
        debug!("SQLite: {}", sql);
        self.connection
            .execute_batch(sql)
            .map_err(|e| DatabaseError::TransactionFailed(format!("{}: {}", sql, e)))
    }
}

impl StatementSink for SqliteSink {
    fn begin(&mut self) -> DatabaseResult<()> {
        self.control("PRAGMA synchronous = OFF;")?;
        self.control("BEGIN TRANSACTION;")
    }

    fn run(&mut self, statement: &str) -> DatabaseResult<()> {
        self.connection
            .execute_batch(statement)
            .map_err(|e| DatabaseError::statement_failed(statement, e))
    }

    fn end(&mut self) -> DatabaseResult<()> {
        self.control("END TRANSACTION;")
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
        debug!("SQLite: {} = {:?}", sql, last);
        Ok(last.map(|key| key.max(0) as u64))
    }

    fn name(&self) -> &'static str {
        "sqlite"
    }
}
