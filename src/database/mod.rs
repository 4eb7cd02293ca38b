//! Statement sinks
//!
//! The generators hand SQL text to a [`StatementSink`]. Supported sinks:
//! - Text: an append-only SQL script (file or stdout)
//! - Executor: any caller-supplied SQL executor without transaction control
//! - DuckDB: embedded database (feature `duckdb-backend`)
//! - SQLite: database file (feature `sqlite-backend`)
//!
//! The concrete sink is chosen once from a [`Destination`] descriptor and
//! wrapped in [`SqlSink`]. A [`Session`] owns the sink together with the
//! checked paths and the surrogate key counter for one export run.

pub mod config;
pub mod destination;
#[cfg(feature = "duckdb-backend")]
pub mod duckdb;
pub mod executor;
pub mod session;
#[cfg(feature = "sqlite-backend")]
pub mod sqlite;
pub mod text;

pub use config::ExportConfig;
pub use destination::Destination;
#[cfg(feature = "duckdb-backend")]
pub use self::duckdb::DuckDBSink;
pub use executor::{ExecutorSink, StatementExecutor};
pub use session::Session;
#[cfg(feature = "sqlite-backend")]
pub use sqlite::SqliteSink;
pub use text::TextSink;

use tracing::error;

/// Error type for sink operations
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    /// Failed to open the destination
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// A statement was rejected by the sink
    #[error("Statement failed: {message}\nLast SQL: {statement}")]
    StatementFailed {
        /// The statement as it was sent
        statement: String,
        /// Backend error message
        message: String,
    },

    /// Opening or closing the transaction bracket failed
    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    /// Destination descriptor could not be used
    #[error("Invalid destination: {0}")]
    InvalidDestination(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// IO error
    #[error("IO error: {0}")]
    IoError(String),
}

impl DatabaseError {
    /// The offending statement, if the error came from one
    pub fn statement(&self) -> Option<&str> {
        match self {
            DatabaseError::StatementFailed { statement, .. } => Some(statement),
            _ => None,
        }
    }

    /// Build a [`DatabaseError::StatementFailed`] and log the statement
    pub(crate) fn statement_failed(statement: &str, message: impl std::fmt::Display) -> Self {
        error!("Last SQL: {}", statement);
        DatabaseError::StatementFailed {
            statement: statement.to_string(),
            message: message.to_string(),
        }
    }
}

/// Result type for sink operations
pub type DatabaseResult<T> = Result<T, DatabaseError>;

/// Destination for generated SQL
///
/// `begin` and `end` bracket one generator invocation. `rollback` replaces
/// `end` when the invocation fails; sinks without transactions treat both as
/// markers or no-ops.
pub trait StatementSink {
    /// Open the transaction bracket
    fn begin(&mut self) -> DatabaseResult<()>;

    /// Execute or record one statement
    fn run(&mut self, statement: &str) -> DatabaseResult<()>;

    /// Close the transaction bracket and flush
    fn end(&mut self) -> DatabaseResult<()>;

    /// Abandon the transaction bracket
    fn rollback(&mut self) -> DatabaseResult<()> {
        Ok(())
    }

    /// Largest surrogate key already stored in `table`
    ///
    /// Sinks that cannot read back return `None`.
    fn last_key(&mut self, _table: &str, _key_column: &str) -> DatabaseResult<Option<u64>> {
        Ok(None)
    }

    /// Backend name for logging
    fn name(&self) -> &'static str;
}

/// `SELECT MAX(<key>) FROM <table>` for the database sinks
#[cfg(any(feature = "duckdb-backend", feature = "sqlite-backend"))]
pub(crate) fn max_key_sql(table: &str, key_column: &str) -> String {
    use crate::export::quote_identifier;

    format!(
        "SELECT MAX({}) FROM {};",
        quote_identifier(key_column),
        quote_identifier(table)
    )
}

/// The closed set of sinks a [`Destination`] can open
pub enum SqlSink {
    Text(TextSink),
    Executor(ExecutorSink<Box<dyn StatementExecutor + Send>>),
    #[cfg(feature = "duckdb-backend")]
    DuckDB(DuckDBSink),
    #[cfg(feature = "sqlite-backend")]
    Sqlite(SqliteSink),
}

impl std::fmt::Debug for SqlSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SqlSink({})", self.name())
    }
}

impl SqlSink {
    /// Wrap a caller-supplied executor
    pub fn executor(executor: impl StatementExecutor + Send + 'static) -> Self {
        let executor: Box<dyn StatementExecutor + Send> = Box::new(executor);
        SqlSink::Executor(ExecutorSink::new(executor))
    }
}

impl StatementSink for SqlSink {
    fn begin(&mut self) -> DatabaseResult<()> {
        match self {
            SqlSink::Text(sink) => sink.begin(),
            SqlSink::Executor(sink) => sink.begin(),
            #[cfg(feature = "duckdb-backend")]
            SqlSink::DuckDB(sink) => sink.begin(),
            #[cfg(feature = "sqlite-backend")]
            SqlSink::Sqlite(sink) => sink.begin(),
        }
    }

    fn run(&mut self, statement: &str) -> DatabaseResult<()> {
        match self {
            SqlSink::Text(sink) => sink.run(statement),
            SqlSink::Executor(sink) => sink.run(statement),
            #[cfg(feature = "duckdb-backend")]
            SqlSink::DuckDB(sink) => sink.run(statement),
            #[cfg(feature = "sqlite-backend")]
            SqlSink::Sqlite(sink) => sink.run(statement),
        }
    }

    fn end(&mut self) -> DatabaseResult<()> {
        match self {
            SqlSink::Text(sink) => sink.end(),
            SqlSink::Executor(sink) => sink.end(),
            #[cfg(feature = "duckdb-backend")]
            SqlSink::DuckDB(sink) => sink.end(),
            #[cfg(feature = "sqlite-backend")]
            SqlSink::Sqlite(sink) => sink.end(),
        }
    }

    fn rollback(&mut self) -> DatabaseResult<()> {
        match self {
            SqlSink::Text(sink) => sink.rollback(),
            SqlSink::Executor(sink) => sink.rollback(),
            #[cfg(feature = "duckdb-backend")]
            SqlSink::DuckDB(sink) => sink.rollback(),
            #[cfg(feature = "sqlite-backend")]
            SqlSink::Sqlite(sink) => sink.rollback(),
        }
    }

    fn last_key(&mut self, table: &str, key_column: &str) -> DatabaseResult<Option<u64>> {
        match self {
            SqlSink::Text(sink) => sink.last_key(table, key_column),
            SqlSink::Executor(sink) => sink.last_key(table, key_column),
            #[cfg(feature = "duckdb-backend")]
            SqlSink::DuckDB(sink) => sink.last_key(table, key_column),
            #[cfg(feature = "sqlite-backend")]
            SqlSink::Sqlite(sink) => sink.last_key(table, key_column),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            SqlSink::Text(sink) => sink.name(),
            SqlSink::Executor(sink) => sink.name(),
            #[cfg(feature = "duckdb-backend")]
            SqlSink::DuckDB(sink) => sink.name(),
            #[cfg(feature = "sqlite-backend")]
            SqlSink::Sqlite(sink) => sink.name(),
        }
    }
}
