//! Export command handler

use std::path::PathBuf;

use tracing::{info, warn};

use crate::cli::commands::{load_document, prepare};
use crate::cli::error::CliError;
use crate::database::{Destination, Session};
use crate::export::{DDLExporter, MappingOptions};

/// Arguments for the export command
#[derive(Debug, Clone)]
pub struct ExportArgs {
    /// Documents to load; the first one defines the schema
    pub inputs: Vec<PathBuf>,
    pub destination: Destination,
    pub selection: Option<PathBuf>,
    pub ignore_ns: bool,
    pub full_name: bool,
    /// Skip DROP/CREATE and only insert rows
    pub data_only: bool,
}

/// Counts reported by an export run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExportSummary {
    pub ddl_statements: usize,
    pub insert_statements: usize,
    pub documents: usize,
}

/// Create the schema once, then load every document
pub fn handle_export(args: &ExportArgs) -> Result<ExportSummary, CliError> {
    let Some(first) = args.inputs.first() else {
        return Err(CliError::InvalidArgument(
            "At least one XML file is required".to_string(),
        ));
    };

    if !args.data_only {
        check_fresh_duckdb(&args.destination)?;
    }

    let prepared = prepare(first, args.selection.as_ref(), args.ignore_ns)?;
    let options = MappingOptions::new(prepared.ignore_ns, args.full_name);
    let exporter = DDLExporter::new(options.full_name);
    let mut session = Session::open(&args.destination, prepared.checked.clone(), options)?;
    let mut summary = ExportSummary::default();

    if args.data_only {
        let tables = exporter.tables(&prepared.analysis.tree, &prepared.checked);
        if session.resume_keys(&tables)? == 0 && args.destination.is_script() {
            warn!("Surrogate keys start at 1; {} cannot read existing rows", args.destination);
        }
    } else {
        let ddl = exporter.statements(&prepared.analysis.tree, &prepared.checked);
        summary.ddl_statements = session.create_schema(&ddl)?;
    }

    summary.insert_statements += session.load_document(&prepared.document.root)?;
    summary.documents += 1;

    for input in &args.inputs[1..] {
        let document = load_document(input)?;
        summary.insert_statements += session.load_document(&document.root)?;
        summary.documents += 1;
        info!("Loaded {}", input.display());
    }

    info!(
        "Exported {} documents to {}: {} DDL and {} INSERT statements",
        summary.documents, args.destination, summary.ddl_statements, summary.insert_statements
    );
    Ok(summary)
}

/// Refuse to recreate the schema in an existing DuckDB file
///
/// DuckDB rejects `DROP TABLE` on a table that another table still
/// references, so the DDL only runs against a fresh database.
fn check_fresh_duckdb(destination: &Destination) -> Result<(), CliError> {
    if let Destination::DuckDB(_) = destination
        && let Some(path) = destination.database_path()
        && path.exists()
    {
        return Err(CliError::InvalidArgument(format!(
            "DuckDB database {} already exists; remove it or load with --data-only",
            path.display()
        )));
    }
    Ok(())
}
