//! End-to-end tests: parse, analyze, create the schema and load documents

use xml2sql::database::{DatabaseError, Destination, ExecutorSink, Session, StatementExecutor};
use xml2sql::export::{DDLExporter, MappingOptions};
use xml2sql::import::XMLImporter;
use xml2sql::models::XmlDocument;
use xml2sql::schema::{Analysis, SchemaAnalyzer};

const FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<f:Feed xmlns:f="urn:feed">
  <f:Entry id="1"><f:Title>It's here</f:Title><f:Tag>a</f:Tag><f:Tag>b</f:Tag></f:Entry>
  <f:Entry id="2"><f:Title>Second</f:Title><f:Tag>c</f:Tag><f:Tag>d</f:Tag></f:Entry>
</f:Feed>
"#;

const FEED_UPDATE: &str = r#"<f:Feed xmlns:f="urn:feed">
  <f:Entry id="3"><f:Title>Third</f:Title><f:Tag>e</f:Tag></f:Entry>
</f:Feed>
"#;

fn parse(xml: &str) -> XmlDocument {
    XMLImporter::new().parse(xml).unwrap()
}

fn analyze(doc: &XmlDocument) -> Analysis {
    SchemaAnalyzer::new(true).analyze(&doc.root)
}

fn options() -> MappingOptions {
    MappingOptions::new(true, false)
}

mod recording {
    use super::*;

    #[test]
    fn test_full_run() {
        let doc = parse(FEED);
        let analysis = analyze(&doc);
        let ddl = DDLExporter::new(false).statements(&analysis.tree, &analysis.checked);

        let mut session = Session::new(ExecutorSink::recording(), analysis.checked, options());
        assert_eq!(session.create_schema(&ddl).unwrap(), 6);
        assert_eq!(session.load_document(&doc.root).unwrap(), 7);
        assert_eq!(session.load_document(&parse(FEED_UPDATE).root).unwrap(), 3);

        let statements = session.into_sink().into_statements();
        assert_eq!(statements.len(), 16);
        assert_eq!(statements[6], r#"INSERT INTO "Feed" ("Feed_ID") VALUES (1);"#);
        assert_eq!(
            statements[7],
            r#"INSERT INTO "Entry" ("Entry_ID", "REFERENCE_ID", "id", "Title") VALUES (1, 1, '1', 'It''s here');"#
        );
        assert_eq!(
            statements[15],
            r#"INSERT INTO "Tag" ("Tag_ID", "REFERENCE_ID", "VALUE") VALUES (5, 3, 'e');"#
        );
    }

    struct FailAfter(usize);

    impl StatementExecutor for FailAfter {
        fn execute(&mut self, _statement: &str) -> anyhow::Result<()> {
            if self.0 == 0 {
                anyhow::bail!("disk full");
            }
            self.0 -= 1;
            Ok(())
        }
    }

    #[test]
    fn test_failure_names_the_statement() {
        let doc = parse(FEED);
        let analysis = analyze(&doc);
        let mut session = Session::new(ExecutorSink::new(FailAfter(2)), analysis.checked, options());

        let err = session.load_document(&doc.root).unwrap_err();
        match err {
            DatabaseError::StatementFailed { statement, message } => {
                assert!(statement.starts_with("INSERT INTO \"Tag\""));
                assert!(message.contains("disk full"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}

mod script {
    use super::*;

    #[test]
    fn test_script_destination() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("feed.sql");
        let destination: Destination = format!("file:///{}", path.display()).parse().unwrap();

        let doc = parse(FEED);
        let analysis = analyze(&doc);
        let ddl = DDLExporter::new(false).statements(&analysis.tree, &analysis.checked);
        let mut session = Session::open(&destination, analysis.checked, options()).unwrap();
        session.create_schema(&ddl).unwrap();
        session.load_document(&doc.root).unwrap();
        drop(session);

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("BEGIN TRANSACTION;\nDROP TABLE IF EXISTS \"Feed\";\n"));
        assert_eq!(content.matches("END TRANSACTION;").count(), 2);
        assert_eq!(content.matches("INSERT INTO").count(), 7);
    }
}

#[cfg(feature = "duckdb-backend")]
mod duckdb_backend {
    use super::*;
    use xml2sql::database::DuckDBSink;

    fn count(sink: &DuckDBSink, sql: &str) -> i64 {
        sink.connection().query_row(sql, [], |row| row.get(0)).unwrap()
    }

    #[test]
    fn test_round_trip() {
        let doc = parse(FEED);
        let analysis = analyze(&doc);
        let ddl = DDLExporter::new(false).statements(&analysis.tree, &analysis.checked);

        let mut session =
            Session::new(DuckDBSink::in_memory().unwrap(), analysis.checked, options());
        session.create_schema(&ddl).unwrap();
        session.load_document(&doc.root).unwrap();
        session.load_document(&parse(FEED_UPDATE).root).unwrap();

        let sink = session.into_sink();
        assert_eq!(count(&sink, "SELECT COUNT(*) FROM \"Entry\""), 3);
        assert_eq!(count(&sink, "SELECT COUNT(*) FROM \"Tag\""), 5);
        assert_eq!(
            count(
                &sink,
                "SELECT COUNT(*) FROM \"Tag\" t JOIN \"Entry\" e ON t.\"REFERENCE_ID\" = e.\"Entry_ID\" WHERE e.\"id\" = '1'"
            ),
            2
        );
    }

    #[test]
    fn test_failed_document_is_rolled_back() {
        let doc = parse(FEED);
        let analysis = analyze(&doc);
        let ddl = DDLExporter::new(false).statements(&analysis.tree, &analysis.checked);

        let mut session =
            Session::new(DuckDBSink::in_memory().unwrap(), analysis.checked, options());
        session.create_schema(&ddl).unwrap();
        session.load_document(&doc.root).unwrap();

        // A fresh counter collides with the keys already loaded
        let mut session = Session::new(
            session.into_sink(),
            analyze(&doc).checked,
            options(),
        );
        assert!(session.load_document(&parse(FEED_UPDATE).root).is_err());

        let sink = session.into_sink();
        assert_eq!(count(&sink, "SELECT COUNT(*) FROM \"Entry\""), 2);
    }
}

#[cfg(feature = "sqlite-backend")]
mod sqlite_backend {
    use super::*;
    use xml2sql::database::SqliteSink;

    #[test]
    fn test_round_trip_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("feed.db");

        let doc = parse(FEED);
        let analysis = analyze(&doc);
        let ddl = DDLExporter::new(false).statements(&analysis.tree, &analysis.checked);

        let mut session = Session::new(SqliteSink::open(&path).unwrap(), analysis.checked, options());
        session.create_schema(&ddl).unwrap();
        session.load_document(&doc.root).unwrap();
        drop(session);

        let sink = SqliteSink::open(&path).unwrap();
        let mut stmt = sink
            .connection()
            .prepare("SELECT \"Title\" FROM \"Entry\" ORDER BY \"Entry_ID\"")
            .unwrap();
        let titles: Vec<String> = stmt
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(titles, vec!["It's here", "Second"]);
    }
}
