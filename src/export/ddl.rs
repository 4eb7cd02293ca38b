//! DDL exporter
//!
//! Turns a schema tree and a checked-path set into `DROP TABLE` and
//! `CREATE TABLE` statements. The root is always a table. Every checked node
//! becomes a table with a surrogate key and a foreign key to its nearest
//! checked ancestor; unchecked descendants are folded into the owning table
//! as dotted-prefix text columns.
//!
//! A table's `CREATE TABLE` is inserted right after its own `DROP TABLE`,
//! ahead of any child table discovered while collecting its columns, so a
//! referenced table is always created before the tables referencing it.

use std::collections::HashSet;

use tracing::{debug, info, warn};

use super::{
    ExportResult, REFERENCE_COLUMN, TableName, VALUE_COLUMN, admit_column, quote_identifier,
};
use crate::schema::namer::{child_prefix, prefix_field};
use crate::schema::{CheckedPaths, NodeId, SchemaTree};

/// DDL Exporter
#[derive(Debug, Clone, Copy, Default)]
pub struct DDLExporter {
    full_name: bool,
}

impl DDLExporter {
    /// Create a DDL exporter
    ///
    /// # Arguments
    ///
    /// * `full_name` - Use the canonical path as the visible table name
    pub fn new(full_name: bool) -> Self {
        Self { full_name }
    }

    /// Generate the ordered DDL statements
    ///
    /// # Example
    ///
    /// ```rust
    /// use xml2sql::export::DDLExporter;
    /// use xml2sql::schema::{CheckedPaths, SchemaTree};
    ///
    /// let tree = SchemaTree::new("Root", "Root");
    /// let statements = DDLExporter::new(false).statements(&tree, &CheckedPaths::new());
    ///
    /// assert_eq!(statements[0], r#"DROP TABLE IF EXISTS "Root";"#);
    /// assert!(statements[1].contains(r#""VALUE" TEXT"#));
    /// ```
    pub fn statements(&self, tree: &SchemaTree, checked: &CheckedPaths) -> Vec<String> {
        let mut writer = DdlWriter {
            tree,
            checked,
            full_name: self.full_name,
            statements: Vec::new(),
            table_names: HashSet::new(),
        };
        writer.create_table(tree.root(), None);

        info!(
            "Generated DDL for {} tables",
            writer.table_names.len()
        );
        writer.statements
    }

    /// Tables the DDL creates, in creation order
    ///
    /// The root comes first, followed by every checked node.
    pub fn tables(&self, tree: &SchemaTree, checked: &CheckedPaths) -> Vec<TableName> {
        tree.walk()
            .into_iter()
            .map(|(_, id)| (id, tree.node(id)))
            .filter(|(id, node)| *id == tree.root() || checked.contains(&node.path))
            .map(|(_, node)| TableName::new(&node.label, &node.path, self.full_name))
            .collect()
    }

    /// Generate DDL as a single script
    pub fn export(&self, tree: &SchemaTree, checked: &CheckedPaths) -> ExportResult {
        let mut content = self.statements(tree, checked).join("\n");
        content.push('\n');
        ExportResult {
            content,
            format: "sql".to_string(),
        }
    }
}

struct DdlWriter<'a> {
    tree: &'a SchemaTree,
    checked: &'a CheckedPaths,
    full_name: bool,
    statements: Vec<String>,
    table_names: HashSet<String>,
}

impl DdlWriter<'_> {
    fn create_table(&mut self, id: NodeId, parent: Option<&TableName>) {
        let node = self.tree.node(id);
        let table = TableName::new(&node.label, &node.path, self.full_name);
        if !self.table_names.insert(table.name.clone()) {
            warn!(
                "Table name '{}' is generated more than once; the last definition wins",
                table.name
            );
        }

        self.statements
            .push(format!("DROP TABLE IF EXISTS {};", quote_identifier(&table.name)));
        let index = self.statements.len();

        let mut columns = Vec::new();
        self.create_fields(id, "", &table, &mut columns);

        debug!("Table {}: {} columns", table.name, columns.len());
        self.statements
            .insert(index, create_table_sql(&table, &columns, parent));
    }

    fn create_fields(
        &mut self,
        id: NodeId,
        prefix: &str,
        table: &TableName,
        columns: &mut Vec<String>,
    ) {
        let tree = self.tree;
        for &child in tree.children(id) {
            let node = tree.node(child);
            if self.checked.contains(&node.path) {
                self.create_table(child, Some(table));
                continue;
            }

            let field = prefix_field(&node.label, prefix);
            if admit_column(table, columns.iter().map(String::as_str), &field) {
                columns.push(field.clone());
            }
            self.create_fields(child, &child_prefix(&field), table, columns);
        }
    }
}

fn create_table_sql(table: &TableName, columns: &[String], parent: Option<&TableName>) -> String {
    let mut sql = format!(
        "CREATE TABLE {} (\n\t{} INTEGER PRIMARY KEY",
        quote_identifier(&table.name),
        quote_identifier(&table.key_column())
    );

    if columns.is_empty() {
        sql.push_str(&format!(",\n\t{} TEXT", quote_identifier(VALUE_COLUMN)));
    }
    for column in columns {
        sql.push_str(&format!(",\n\t{} TEXT", quote_identifier(column)));
    }

    if let Some(parent) = parent {
        let reference = quote_identifier(REFERENCE_COLUMN);
        sql.push_str(&format!(
            ",\n\t{} INTEGER,\n\tFOREIGN KEY ({}) REFERENCES {}({})",
            reference,
            reference,
            quote_identifier(&parent.name),
            quote_identifier(&parent.key_column())
        ));
    }

    sql.push_str("\n);");
    sql
}
