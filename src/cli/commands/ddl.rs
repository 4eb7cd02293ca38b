//! DDL command handler

use std::path::PathBuf;

use crate::cli::commands::prepare;
use crate::cli::error::CliError;
use crate::export::DDLExporter;

/// Arguments for the ddl command
#[derive(Debug, Clone)]
pub struct DdlArgs {
    pub input: PathBuf,
    pub selection: Option<PathBuf>,
    pub ignore_ns: bool,
    pub full_name: bool,
    /// Write the script here instead of stdout
    pub output: Option<PathBuf>,
}

/// Print the DDL script for a document
pub fn handle_ddl(args: &DdlArgs) -> Result<(), CliError> {
    let prepared = prepare(&args.input, args.selection.as_ref(), args.ignore_ns)?;
    let result =
        DDLExporter::new(args.full_name).export(&prepared.analysis.tree, &prepared.checked);

    match &args.output {
        Some(output) => std::fs::write(output, &result.content)
            .map_err(|e| CliError::FileWriteError(output.clone(), e.to_string()))?,
        None => print!("{}", result.content),
    }
    Ok(())
}
