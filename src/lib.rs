//! xml2sql - Relational schemas from arbitrary XML
//!
//! Provides:
//! - XML parsing into an owned element tree
//! - Schema inference: a generalized path tree with default table selection
//! - DDL generation for the selected tables
//! - DML generation replaying documents into that schema
//! - Statement sinks (SQL script, generic executor, DuckDB, SQLite)
//!
//! # Example
//!
//! ```rust
//! use xml2sql::database::{ExecutorSink, Session};
//! use xml2sql::export::{DDLExporter, MappingOptions};
//! use xml2sql::import::XMLImporter;
//! use xml2sql::schema::SchemaAnalyzer;
//!
//! let document = XMLImporter::new()
//!     .parse("<Root><Item>A</Item><Item>B</Item></Root>")
//!     .unwrap();
//! let analysis = SchemaAnalyzer::new(false).analyze(&document.root);
//! let ddl = DDLExporter::new(false).statements(&analysis.tree, &analysis.checked);
//!
//! let mut session = Session::new(
//!     ExecutorSink::recording(),
//!     analysis.checked,
//!     MappingOptions::default(),
//! );
//! session.create_schema(&ddl).unwrap();
//! session.load_document(&document.root).unwrap();
//!
//! let statements = session.into_sink().into_statements();
//! assert_eq!(statements.len(), 7);
//! ```

#[cfg(feature = "cli")]
pub mod cli;
pub mod database;
pub mod export;
pub mod import;
pub mod models;
pub mod schema;

// Re-export commonly used types
pub use database::{
    DatabaseError, DatabaseResult, Destination, ExecutorSink, ExportConfig, Session, SqlSink,
    StatementExecutor, StatementSink, TextSink,
};
pub use export::{DDLExporter, ExportResult, InsertExporter, MappingOptions, SurrogateKeys};
pub use import::{ImportError, XMLImporter};
pub use models::{XmlAttribute, XmlDocument, XmlElement};
pub use schema::{
    Analysis, CheckedPaths, NamingCollision, SchemaAnalyzer, SchemaTree, Selection,
};
