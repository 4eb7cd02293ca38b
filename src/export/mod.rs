//! Export functionality
//!
//! Provides the two SQL generators:
//! - DDL: `DROP TABLE` / `CREATE TABLE` statements from a schema tree
//! - DML: `INSERT` statements from a document instance
//!
//! Both share the naming rules in this module so that inserted columns always
//! match created ones.

pub mod ddl;
pub mod dml;

pub use ddl::DDLExporter;
pub use dml::{InsertExporter, RowRef, SurrogateKeys};

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Name of the back-reference column on child tables
pub const REFERENCE_COLUMN: &str = "REFERENCE_ID";

/// Catch-all column for tables without derived columns
pub const VALUE_COLUMN: &str = "VALUE";

/// Result of an export operation.
///
/// Contains the exported content and format identifier.
#[derive(Debug, Serialize, Deserialize)]
#[must_use = "export results contain the exported content and should be used"]
pub struct ExportResult {
    /// Exported content
    pub content: String,
    /// Format identifier
    pub format: String,
}

/// Naming options shared by analysis, DDL and DML
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingOptions {
    /// Strip namespace qualifiers from tag and attribute names
    #[serde(default)]
    pub ignore_ns: bool,
    /// Use the full canonical path as the visible table name
    #[serde(default)]
    pub full_name: bool,
}

impl MappingOptions {
    pub fn new(ignore_ns: bool, full_name: bool) -> Self {
        Self {
            ignore_ns,
            full_name,
        }
    }
}

/// Table naming for one checked node
///
/// `id` is the clean label and feeds the key column name; `name` is what
/// appears after `CREATE TABLE` / `INSERT INTO`. They differ only in
/// full-name mode, which keeps key columns stable across documents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableName {
    /// Visible table name
    pub name: String,
    /// Identifier-safe name
    pub id: String,
}

impl TableName {
    pub fn new(label: &str, path: &str, full_name: bool) -> Self {
        Self {
            name: if full_name { path } else { label }.to_string(),
            id: label.to_string(),
        }
    }

    /// Surrogate key column, `<id>_ID`
    pub fn key_column(&self) -> String {
        format!("{}_ID", self.id)
    }

    /// Whether `column` clashes with a column every row of this table carries
    fn is_reserved(&self, column: &str) -> bool {
        column == REFERENCE_COLUMN || column == self.key_column()
    }
}

/// Quote an SQL identifier
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Quote a text value as an SQL string literal
pub fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// Check that `column` may be added to `table` next to `existing`
///
/// Distinct source paths can flatten to the same column name; only the first
/// is kept.
fn admit_column<'c>(
    table: &TableName,
    mut existing: impl Iterator<Item = &'c str>,
    column: &str,
) -> bool {
    if table.is_reserved(column) {
        warn!(
            "Column '{}' of table '{}' clashes with a generated column, skipped",
            column, table.name
        );
        return false;
    }
    if existing.any(|c| c == column) {
        warn!(
            "Column '{}' appears more than once in table '{}', keeping the first",
            column, table.name
        );
        return false;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_name() {
        let short = TableName::new("Item", "Root/Item", false);
        assert_eq!(short.name, "Item");
        assert_eq!(short.key_column(), "Item_ID");

        let full = TableName::new("Item", "Root/Item", true);
        assert_eq!(full.name, "Root/Item");
        assert_eq!(full.key_column(), "Item_ID");
    }

    #[test]
    fn test_quoting() {
        assert_eq!(quote_identifier("Item.Name"), "\"Item.Name\"");
        assert_eq!(quote_identifier("a\"b"), "\"a\"\"b\"");
        assert_eq!(quote_literal("O'Brien"), "'O''Brien'");
        assert_eq!(quote_literal("say \"hi\""), "'say \"hi\"'");
    }

    #[test]
    fn test_admit_column() {
        let table = TableName::new("Item", "Root/Item", false);
        let existing = ["a".to_string()];
        assert!(admit_column(&table, existing.iter().map(String::as_str), "b"));
        assert!(!admit_column(&table, existing.iter().map(String::as_str), "a"));
        assert!(!admit_column(&table, std::iter::empty(), "Item_ID"));
        assert!(!admit_column(&table, std::iter::empty(), REFERENCE_COLUMN));
    }
}
