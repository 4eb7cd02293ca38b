//! Destination descriptors
//!
//! A destination names where generated SQL goes:
//!
//! | Descriptor            | Sink                      |
//! |-----------------------|---------------------------|
//! | `-`                   | script on standard output |
//! | `file:///<path>`      | script file               |
//! | `duckdb:///<path>`    | DuckDB database           |
//! | `sqlite:///<path>`    | SQLite database           |
//!
//! `duckdb:///:memory:` opens an in-memory DuckDB database.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{DatabaseError, DatabaseResult, SqlSink, TextSink};

const STDOUT: &str = "-";
const FILE_SCHEME: &str = "file";
const DUCKDB_SCHEME: &str = "duckdb";
const SQLITE_SCHEME: &str = "sqlite";
const SCHEME_SEPARATOR: &str = ":///";
const IN_MEMORY: &str = ":memory:";

/// Where generated SQL is sent
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Destination {
    #[default]
    Stdout,
    File(PathBuf),
    DuckDB(String),
    Sqlite(String),
}

impl Destination {
    /// Whether statements are written as text rather than executed
    pub fn is_script(&self) -> bool {
        matches!(self, Destination::Stdout | Destination::File(_))
    }

    /// Whether this names an in-memory database
    pub fn is_in_memory(&self) -> bool {
        match self {
            Destination::DuckDB(target) | Destination::Sqlite(target) => target == IN_MEMORY,
            _ => false,
        }
    }

    /// Database file this destination names, if any
    pub fn database_path(&self) -> Option<&Path> {
        match self {
            Destination::DuckDB(target) | Destination::Sqlite(target) if target != IN_MEMORY => {
                Some(Path::new(target))
            }
            _ => None,
        }
    }

    /// Open the sink this destination names
    pub fn open(&self) -> DatabaseResult<SqlSink> {
        match self {
            Destination::Stdout => Ok(SqlSink::Text(TextSink::stdout())),
            Destination::File(path) => Ok(SqlSink::Text(TextSink::create(path)?)),
            Destination::DuckDB(target) => open_duckdb(target),
            Destination::Sqlite(target) => open_sqlite(target),
        }
    }
}

#[cfg(feature = "duckdb-backend")]
fn open_duckdb(target: &str) -> DatabaseResult<SqlSink> {
    use super::DuckDBSink;

    let sink = if target == IN_MEMORY {
        DuckDBSink::in_memory()?
    } else {
        DuckDBSink::open(target)?
    };
    Ok(SqlSink::DuckDB(sink))
}

#[cfg(not(feature = "duckdb-backend"))]
fn open_duckdb(target: &str) -> DatabaseResult<SqlSink> {
    Err(DatabaseError::InvalidDestination(format!(
        "{}{}{}: DuckDB support not compiled in (enable feature 'duckdb-backend')",
        DUCKDB_SCHEME, SCHEME_SEPARATOR, target
    )))
}

#[cfg(feature = "sqlite-backend")]
fn open_sqlite(target: &str) -> DatabaseResult<SqlSink> {
    use super::SqliteSink;

    let sink = if target == IN_MEMORY {
        SqliteSink::in_memory()?
    } else {
        SqliteSink::open(target)?
    };
    Ok(SqlSink::Sqlite(sink))
}

#[cfg(not(feature = "sqlite-backend"))]
fn open_sqlite(target: &str) -> DatabaseResult<SqlSink> {
    Err(DatabaseError::InvalidDestination(format!(
        "{}{}{}: SQLite support not compiled in (enable feature 'sqlite-backend')",
        SQLITE_SCHEME, SCHEME_SEPARATOR, target
    )))
}

impl FromStr for Destination {
    type Err = DatabaseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s == STDOUT {
            return Ok(Destination::Stdout);
        }

        let Some((scheme, target)) = s.split_once(SCHEME_SEPARATOR) else {
            return Err(DatabaseError::InvalidDestination(format!(
                "'{}' is neither '-' nor '<scheme>{}<path>'",
                s, SCHEME_SEPARATOR
            )));
        };
        if target.is_empty() {
            return Err(DatabaseError::InvalidDestination(format!(
                "'{}' has no path",
                s
            )));
        }

        match scheme.to_lowercase().as_str() {
            FILE_SCHEME => Ok(Destination::File(PathBuf::from(target))),
            DUCKDB_SCHEME => Ok(Destination::DuckDB(target.to_string())),
            SQLITE_SCHEME => Ok(Destination::Sqlite(target.to_string())),
            other => Err(DatabaseError::InvalidDestination(format!(
                "Unknown scheme '{}' (expected file, duckdb or sqlite)",
                other
            ))),
        }
    }
}

impl TryFrom<String> for Destination {
    type Error = DatabaseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Destination> for String {
    fn from(value: Destination) -> Self {
        value.to_string()
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Destination::Stdout => write!(f, "{}", STDOUT),
            Destination::File(path) => {
                write!(f, "{}{}{}", FILE_SCHEME, SCHEME_SEPARATOR, path.display())
            }
            Destination::DuckDB(target) => {
                write!(f, "{}{}{}", DUCKDB_SCHEME, SCHEME_SEPARATOR, target)
            }
            Destination::Sqlite(target) => {
                write!(f, "{}{}{}", SQLITE_SCHEME, SCHEME_SEPARATOR, target)
            }
        }
    }
}
