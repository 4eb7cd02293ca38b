//! Export session
//!
//! Holds everything one export run shares between generator invocations:
//! the sink, the checked-path set, the naming options and the surrogate key
//! counter. Every generator invocation runs inside one transaction bracket.

use tracing::{info, warn};

use super::{DatabaseResult, Destination, SqlSink, StatementSink};
use crate::export::{InsertExporter, MappingOptions, SurrogateKeys, TableName};
use crate::models::XmlElement;
use crate::schema::CheckedPaths;

/// One export run
#[derive(Debug)]
pub struct Session<S: StatementSink = SqlSink> {
    sink: S,
    checked: CheckedPaths,
    options: MappingOptions,
    keys: SurrogateKeys,
}

impl Session<SqlSink> {
    /// Open the sink named by `destination`
    pub fn open(
        destination: &Destination,
        checked: CheckedPaths,
        options: MappingOptions,
    ) -> DatabaseResult<Self> {
        let sink = destination.open()?;
        info!("Exporting to {} ({})", destination, sink.name());
        Ok(Self::new(sink, checked, options))
    }
}

impl<S: StatementSink> Session<S> {
    pub fn new(sink: S, checked: CheckedPaths, options: MappingOptions) -> Self {
        Self {
            sink,
            checked,
            options,
            keys: SurrogateKeys::new(),
        }
    }

    /// Continue numbering from an existing counter
    pub fn with_keys(mut self, keys: SurrogateKeys) -> Self {
        self.keys = keys;
        self
    }

    pub fn checked(&self) -> &CheckedPaths {
        &self.checked
    }

    pub fn options(&self) -> MappingOptions {
        self.options
    }

    pub fn keys(&self) -> &SurrogateKeys {
        &self.keys
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Continue surrogate keys after the rows already stored in `tables`
    ///
    /// Needed before loading into an existing schema. Sinks that cannot read
    /// back leave the counter unchanged.
    ///
    /// # Returns
    ///
    /// Number of tables whose counter was advanced
    pub fn resume_keys(&mut self, tables: &[TableName]) -> DatabaseResult<usize> {
        let mut resumed = 0;
        for table in tables {
            if let Some(last) = self.sink.last_key(&table.name, &table.key_column())? {
                self.keys.reserve(&table.id, last);
                resumed += 1;
            }
        }
        info!(
            "Resumed surrogate keys for {} of {} tables on {}",
            resumed,
            tables.len(),
            self.sink.name()
        );
        Ok(resumed)
    }

    /// Run DDL statements in one transaction
    ///
    /// # Returns
    ///
    /// Number of statements executed
    pub fn create_schema(&mut self, statements: &[String]) -> DatabaseResult<usize> {
        self.transaction(|sink, _, _, _| {
            for statement in statements {
                sink.run(statement)?;
            }
            Ok(statements.len())
        })
    }

    /// Insert one document in one transaction
    ///
    /// Surrogate keys continue from the previous document.
    ///
    /// # Returns
    ///
    /// Number of statements executed
    pub fn load_document(&mut self, root: &XmlElement) -> DatabaseResult<usize> {
        self.transaction(|sink, checked, options, keys| {
            InsertExporter::new(checked, options, keys).insert_document(root, sink)
        })
    }

    /// Bracket `body` with begin/end, rolling back when anything fails
    fn transaction<T>(
        &mut self,
        body: impl FnOnce(
            &mut dyn StatementSink,
            &CheckedPaths,
            MappingOptions,
            &mut SurrogateKeys,
        ) -> DatabaseResult<T>,
    ) -> DatabaseResult<T> {
        let Self {
            sink,
            checked,
            options,
            keys,
        } = self;

        sink.begin()?;
        let result = body(&mut *sink, checked, *options, keys).and_then(|value| {
            sink.end()?;
            Ok(value)
        });

        if result.is_err()
            && let Err(e) = sink.rollback()
        {
            warn!("Rollback on {} failed: {}", sink.name(), e);
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{DatabaseError, ExecutorSink, StatementExecutor, TextSink};
    use tempfile::tempdir;

    fn list_document(items: &[&str]) -> XmlElement {
        items.iter().fold(XmlElement::new("Root"), |root, item| {
            root.with_child(XmlElement::new("Item").with_text(*item))
        })
    }

    fn checked() -> CheckedPaths {
        ["Root/Item"].into_iter().collect()
    }

    struct FailOn(&'static str);

    impl StatementExecutor for FailOn {
        fn execute(&mut self, statement: &str) -> anyhow::Result<()> {
            if statement.contains(self.0) {
                anyhow::bail!("constraint violated");
            }
            Ok(())
        }
    }

    #[test]
    fn test_keys_persist_across_documents() {
        let mut session = Session::new(
            ExecutorSink::recording(),
            checked(),
            MappingOptions::default(),
        );

        assert_eq!(session.load_document(&list_document(&["A", "B"])).unwrap(), 3);
        assert_eq!(session.load_document(&list_document(&["C"])).unwrap(), 2);
        assert_eq!(session.keys().last("Root"), Some(2));
        assert_eq!(session.keys().last("Item"), Some(3));

        let statements = session.into_sink().into_statements();
        assert_eq!(
            statements[4],
            r#"INSERT INTO "Item" ("Item_ID", "REFERENCE_ID", "VALUE") VALUES (3, 2, 'C');"#
        );
    }

    #[test]
    fn test_with_keys() {
        let mut keys = SurrogateKeys::new();
        keys.next("Root");
        let mut session = Session::new(
            ExecutorSink::recording(),
            CheckedPaths::new(),
            MappingOptions::default(),
        )
        .with_keys(keys);

        session.load_document(&XmlElement::new("Root")).unwrap();
        assert_eq!(session.keys().last("Root"), Some(2));
    }

    struct StoredRows;

    impl StatementSink for StoredRows {
        fn begin(&mut self) -> DatabaseResult<()> {
            Ok(())
        }

        fn run(&mut self, _statement: &str) -> DatabaseResult<()> {
            Ok(())
        }

        fn end(&mut self) -> DatabaseResult<()> {
            Ok(())
        }

        fn last_key(&mut self, table: &str, key_column: &str) -> DatabaseResult<Option<u64>> {
            assert_eq!(key_column, format!("{table}_ID"));
            Ok(match table {
                "Root" => Some(4),
                "Item" => Some(9),
                _ => None,
            })
        }

        fn name(&self) -> &'static str {
            "stored"
        }
    }

    #[test]
    fn test_resume_keys_from_sink() {
        let tables = [
            TableName::new("Root", "Root", false),
            TableName::new("Item", "Root/Item", false),
            TableName::new("Note", "Root/Note", false),
        ];
        let mut session = Session::new(StoredRows, checked(), MappingOptions::default());

        assert_eq!(session.resume_keys(&tables).unwrap(), 2);
        assert_eq!(session.keys().last("Root"), Some(4));
        assert_eq!(session.keys().last("Item"), Some(9));
        assert_eq!(session.keys().last("Note"), None);
    }

    #[test]
    fn test_resume_keys_without_read_back() {
        let mut session = Session::new(
            ExecutorSink::recording(),
            checked(),
            MappingOptions::default(),
        );
        let tables = [TableName::new("Root", "Root", false)];

        assert_eq!(session.resume_keys(&tables).unwrap(), 0);
        assert!(session.keys().is_empty());
    }

    #[test]
    fn test_failure_carries_statement() {
        let mut session = Session::new(
            ExecutorSink::new(FailOn("'B'")),
            checked(),
            MappingOptions::default(),
        );

        let err = session.load_document(&list_document(&["A", "B"])).unwrap_err();
        assert!(matches!(err, DatabaseError::StatementFailed { .. }));
        assert!(err.statement().unwrap().contains("'B'"));
    }

    #[test]
    fn test_text_script_brackets() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.sql");
        let mut session = Session::new(
            TextSink::create(&path).unwrap(),
            checked(),
            MappingOptions::default(),
        );

        session
            .create_schema(&["DROP TABLE IF EXISTS \"Root\";".to_string()])
            .unwrap();
        session.load_document(&list_document(&["A"])).unwrap();
        drop(session);

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(
            lines,
            vec![
                "BEGIN TRANSACTION;",
                "DROP TABLE IF EXISTS \"Root\";",
                "END TRANSACTION;",
                "BEGIN TRANSACTION;",
                "INSERT INTO \"Root\" (\"Root_ID\") VALUES (1);",
                "INSERT INTO \"Item\" (\"Item_ID\", \"REFERENCE_ID\", \"VALUE\") VALUES (1, 1, 'A');",
                "END TRANSACTION;",
            ]
        );
    }

    #[test]
    fn test_open_file_destination() {
        let dir = tempdir().unwrap();
        let destination = Destination::File(dir.path().join("out.sql"));
        let mut session =
            Session::open(&destination, checked(), MappingOptions::default()).unwrap();

        assert_eq!(session.sink().name(), "text");
        session.load_document(&list_document(&["A"])).unwrap();
        drop(session);

        let content = std::fs::read_to_string(dir.path().join("out.sql")).unwrap();
        assert!(content.starts_with("BEGIN TRANSACTION;\n"));
        assert!(content.ends_with("END TRANSACTION;\n"));
    }
}
