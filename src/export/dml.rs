//! DML exporter
//!
//! Replays a document into the schema produced by the DDL exporter. Every
//! instance of a checked node becomes one `INSERT` with a fresh surrogate key;
//! rows of nested checked nodes carry a `REFERENCE_ID` to their owning row.
//!
//! A nested row's statement, followed by the statements of its own subtree,
//! is returned to the owning row and queued behind the owner's `INSERT`. Only
//! top-level rows reach the sink directly, so a referencing row is never
//! executed before the row it references.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::{
    MappingOptions, REFERENCE_COLUMN, TableName, VALUE_COLUMN, admit_column, quote_identifier,
    quote_literal,
};
use crate::database::{DatabaseResult, StatementSink};
use crate::models::XmlElement;
use crate::schema::namer::{QualifiedName, child_prefix, name_for, prefix_field};
use crate::schema::CheckedPaths;

/// Last assigned surrogate key per table id
///
/// Keys are monotonic for the lifetime of this value. Reuse one instance for
/// every document loaded into the same schema.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SurrogateKeys(BTreeMap<String, u64>);

impl SurrogateKeys {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the next key for `table_id`, starting at 1
    pub fn next(&mut self, table_id: &str) -> u64 {
        let key = self.0.entry(table_id.to_string()).or_insert(0);
        *key += 1;
        *key
    }

    /// Continue numbering `table_id` after `last`
    ///
    /// Never moves the counter backwards.
    pub fn reserve(&mut self, table_id: &str, last: u64) {
        let key = self.0.entry(table_id.to_string()).or_insert(0);
        *key = (*key).max(last);
    }

    /// Last key handed out for `table_id`
    pub fn last(&self, table_id: &str) -> Option<u64> {
        self.0.get(table_id).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.0.iter().map(|(table, key)| (table.as_str(), *key))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Reference to a row being generated
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowRef {
    /// Surrogate key column of the row's table
    pub column: String,
    /// Surrogate key value
    pub id: u64,
}

/// Field values collected for one row, in discovery order
type Fields = Vec<(String, String)>;

/// DML Exporter
///
/// Borrows the session's checked set and key counter for one pass.
#[derive(Debug)]
pub struct InsertExporter<'a> {
    checked: &'a CheckedPaths,
    options: MappingOptions,
    keys: &'a mut SurrogateKeys,
}

impl<'a> InsertExporter<'a> {
    pub fn new(
        checked: &'a CheckedPaths,
        options: MappingOptions,
        keys: &'a mut SurrogateKeys,
    ) -> Self {
        Self {
            checked,
            options,
            keys,
        }
    }

    /// Insert a whole document
    ///
    /// The document element is always a table, matching the DDL exporter.
    ///
    /// # Returns
    ///
    /// Number of statements sent to the sink
    pub fn insert_document(
        &mut self,
        root: &XmlElement,
        sink: &mut dyn StatementSink,
    ) -> DatabaseResult<usize> {
        let qn = name_for(&root.tag, "", self.options.ignore_ns);
        let statements = self.insert_table(root, &qn, None);
        info!("Generated {} INSERT statements for <{}>", statements.len(), qn.name);
        flush(statements, sink)
    }

    /// Insert the checked nodes at or below `node`
    ///
    /// Unchecked nodes on the way are structural only and contribute no
    /// values. Each checked node found becomes a top-level row and is sent
    /// to the sink together with its subtree before the search continues.
    ///
    /// # Arguments
    ///
    /// * `node` - Element to start from
    /// * `parent_path` - Canonical path of `node`'s parent, empty for a root
    /// * `sink` - Destination for the statements
    pub fn insert_node(
        &mut self,
        node: &XmlElement,
        parent_path: &str,
        sink: &mut dyn StatementSink,
    ) -> DatabaseResult<usize> {
        let qn = name_for(&node.tag, parent_path, self.options.ignore_ns);
        if self.checked.contains(&qn.path) {
            let statements = self.insert_table(node, &qn, None);
            return flush(statements, sink);
        }

        let mut count = 0;
        for child in &node.children {
            count += self.insert_node(child, &qn.path, sink)?;
        }
        Ok(count)
    }

    /// Generate one row and the rows of its checked descendants
    ///
    /// The row's own statement comes first, followed by every pending
    /// statement of its subtree in depth-first discovery order.
    fn insert_table(
        &mut self,
        node: &XmlElement,
        qn: &QualifiedName,
        parent: Option<&RowRef>,
    ) -> Vec<String> {
        let (table, row) = self.allocate_row(qn);

        let mut fields = Fields::new();
        let mut pending = Vec::new();
        self.insert_fields(node, &qn.path, "", &table, &row, &mut fields, &mut pending);

        if let Some(text) = node.trimmed_text() {
            if fields.is_empty() {
                fields.push((VALUE_COLUMN.to_string(), text.to_string()));
            } else {
                warn!(
                    "Text of <{}> row {} is dropped; table '{}' has no {} column",
                    qn.name, row.id, table.name, VALUE_COLUMN
                );
            }
        }

        let mut statements = Vec::with_capacity(pending.len() + 1);
        statements.push(insert_sql(&table, &row, parent, &fields));
        statements.extend(pending);
        statements
    }

    /// Row for a checked attribute: a leaf table holding the value
    fn insert_attribute_table(
        &mut self,
        qn: &QualifiedName,
        value: &str,
        parent: &RowRef,
    ) -> String {
        let (table, row) = self.allocate_row(qn);
        let fields = vec![(VALUE_COLUMN.to_string(), value.to_string())];
        insert_sql(&table, &row, Some(parent), &fields)
    }

    fn allocate_row(&mut self, qn: &QualifiedName) -> (TableName, RowRef) {
        let table = TableName::new(&qn.name, &qn.path, self.options.full_name);
        let row = RowRef {
            column: table.key_column(),
            id: self.keys.next(&table.id),
        };
        debug!("Row {}.{} = {}", table.name, row.column, row.id);
        (table, row)
    }

    #[allow(clippy::too_many_arguments)]
    fn insert_fields(
        &mut self,
        node: &XmlElement,
        parent_path: &str,
        prefix: &str,
        table: &TableName,
        row: &RowRef,
        fields: &mut Fields,
        pending: &mut Vec<String>,
    ) {
        for attr in &node.attributes {
            let value = attr.value.trim();
            if value.is_empty() {
                continue;
            }
            let qn = name_for(&attr.name, parent_path, self.options.ignore_ns);
            if self.checked.contains(&qn.path) {
                pending.push(self.insert_attribute_table(&qn, value, row));
            } else {
                add_field(table, fields, prefix_field(&qn.name, prefix), value);
            }
        }

        for child in &node.children {
            let qn = name_for(&child.tag, parent_path, self.options.ignore_ns);
            if self.checked.contains(&qn.path) {
                pending.extend(self.insert_table(child, &qn, Some(row)));
                continue;
            }

            let field = prefix_field(&qn.name, prefix);
            if let Some(text) = child.trimmed_text() {
                add_field(table, fields, field.clone(), text);
            }
            self.insert_fields(
                child,
                &qn.path,
                &child_prefix(&field),
                table,
                row,
                fields,
                pending,
            );
        }
    }
}

fn add_field(table: &TableName, fields: &mut Fields, column: String, value: &str) {
    if admit_column(table, fields.iter().map(|(c, _)| c.as_str()), &column) {
        fields.push((column, value.to_string()));
    }
}

fn insert_sql(
    table: &TableName,
    row: &RowRef,
    parent: Option<&RowRef>,
    fields: &[(String, String)],
) -> String {
    let mut columns = vec![quote_identifier(&row.column)];
    let mut values = vec![row.id.to_string()];

    if let Some(parent) = parent {
        columns.push(quote_identifier(REFERENCE_COLUMN));
        values.push(parent.id.to_string());
    }
    for (column, value) in fields {
        columns.push(quote_identifier(column));
        values.push(quote_literal(value));
    }

    format!(
        "INSERT INTO {} ({}) VALUES ({});",
        quote_identifier(&table.name),
        columns.join(", "),
        values.join(", ")
    )
}

fn flush(statements: Vec<String>, sink: &mut dyn StatementSink) -> DatabaseResult<usize> {
    let count = statements.len();
    for statement in &statements {
        sink.run(statement)?;
    }
    Ok(count)
}
