//! CLI command implementations

pub mod analyze;
pub mod ddl;
pub mod export;
pub mod init;

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::cli::error::CliError;
use crate::import::XMLImporter;
use crate::models::XmlDocument;
use crate::schema::{Analysis, CheckedPaths, SchemaAnalyzer, Selection};

/// A parsed document together with its analysis and the effective selection
#[derive(Debug)]
pub struct Prepared {
    pub document: XmlDocument,
    pub analysis: Analysis,
    pub checked: CheckedPaths,
    pub ignore_ns: bool,
}

/// Read and parse one XML file
pub fn load_document(path: &Path) -> Result<XmlDocument, CliError> {
    if !path.exists() {
        return Err(CliError::FileNotFound(path.to_path_buf()));
    }
    Ok(XMLImporter::new().parse_file(path)?)
}

/// Parse and analyze `input`, then settle which paths are checked
///
/// A selection file overrides both the default checkmarks and the
/// namespace mode, since its paths are only meaningful in the mode that
/// produced them.
pub fn prepare(
    input: &Path,
    selection: Option<&PathBuf>,
    ignore_ns: bool,
) -> Result<Prepared, CliError> {
    let selection = selection
        .map(|path| {
            Selection::load(path).map_err(|e| CliError::SelectionError(format!("{:#}", e)))
        })
        .transpose()?;

    let ignore_ns = match &selection {
        Some(selection) if selection.ignore_ns != ignore_ns => {
            info!(
                "Using ignore_ns = {} from the selection file",
                selection.ignore_ns
            );
            selection.ignore_ns
        }
        _ => ignore_ns,
    };

    let document = load_document(input)?;
    let analysis = SchemaAnalyzer::new(ignore_ns).analyze(&document.root);

    let checked = match selection {
        Some(selection) => {
            for path in selection.unknown_paths(&analysis.tree) {
                warn!("Checked path '{}' does not occur in {}", path, input.display());
            }
            selection.checked
        }
        None => analysis.checked.clone(),
    };

    Ok(Prepared {
        document,
        analysis,
        checked,
        ignore_ns,
    })
}
