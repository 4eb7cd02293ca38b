//! Text sink
//!
//! Appends statements to an SQL script. Transaction brackets become literal
//! marker lines; nothing is atomic.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::info;

use super::{DatabaseError, DatabaseResult, StatementSink};

pub const BEGIN_MARKER: &str = "BEGIN TRANSACTION;";
pub const END_MARKER: &str = "END TRANSACTION;";
pub const ROLLBACK_MARKER: &str = "ROLLBACK;";

/// Append-only SQL script writer
pub struct TextSink {
    writer: Box<dyn Write + Send>,
    path: Option<PathBuf>,
}

impl std::fmt::Debug for TextSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextSink").field("path", &self.path).finish()
    }
}

impl TextSink {
    /// Write to an arbitrary writer
    pub fn new(writer: impl Write + Send + 'static) -> Self {
        Self {
            writer: Box::new(writer),
            path: None,
        }
    }

    /// Create (or truncate) a script file
    pub fn create(path: impl AsRef<Path>) -> DatabaseResult<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::create(&path).map_err(|e| {
            DatabaseError::ConnectionFailed(format!(
                "Failed to create {}: {}",
                path.display(),
                e
            ))
        })?;
        info!("Writing SQL script to {}", path.display());

        Ok(Self {
            writer: Box::new(BufWriter::new(file)),
            path: Some(path),
        })
    }

    /// Write to standard output
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }

    /// Script file path (None for other writers)
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn write_line(&mut self, line: &str) -> std::io::Result<()> {
        self.writer.write_all(line.as_bytes())?;
        self.writer.write_all(b"\n")
    }

    fn marker(&mut self, marker: &str, flush: bool) -> DatabaseResult<()> {
        self.write_line(marker)
            .and_then(|_| if flush { self.writer.flush() } else { Ok(()) })
            .map_err(|e| DatabaseError::TransactionFailed(format!("{}: {}", marker, e)))
    }
}

impl StatementSink for TextSink {
    fn begin(&mut self) -> DatabaseResult<()> {
        self.marker(BEGIN_MARKER, false)
    }

    fn run(&mut self, statement: &str) -> DatabaseResult<()> {
        self.write_line(statement)
            .map_err(|e| DatabaseError::statement_failed(statement, e))
    }

    fn end(&mut self) -> DatabaseResult<()> {
        self.marker(END_MARKER, true)
    }

    fn rollback(&mut self) -> DatabaseResult<()> {
        self.marker(ROLLBACK_MARKER, true)
    }

    fn name(&self) -> &'static str {
        "text"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_script_layout() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.sql");

        let mut sink = TextSink::create(&path).unwrap();
        assert_eq!(sink.path(), Some(path.as_path()));
        sink.begin().unwrap();
        sink.run("DROP TABLE IF EXISTS \"Root\";").unwrap();
        sink.end().unwrap();
        drop(sink);

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            content,
            "BEGIN TRANSACTION;\nDROP TABLE IF EXISTS \"Root\";\nEND TRANSACTION;\n"
        );
    }

    #[test]
    fn test_rollback_marker() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.sql");

        let mut sink = TextSink::create(&path).unwrap();
        sink.begin().unwrap();
        sink.rollback().unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "BEGIN TRANSACTION;\nROLLBACK;\n");
    }

    #[test]
    fn test_create_in_missing_directory_fails() {
        let dir = tempdir().unwrap();
        let result = TextSink::create(dir.path().join("missing").join("out.sql"));
        assert!(matches!(result, Err(DatabaseError::ConnectionFailed(_))));
    }
}
