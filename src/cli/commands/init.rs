//! Init command handler

use std::path::PathBuf;

use crate::cli::error::CliError;
use crate::database::ExportConfig;
use crate::database::config::{CONFIG_FILENAME, sample_config};

/// Arguments for the init command
#[derive(Debug, Clone)]
pub struct InitArgs {
    /// Directory to write `.xml2sql.toml` into
    pub dir: PathBuf,
    /// Replace an existing configuration file
    pub force: bool,
}

/// Write a commented sample configuration
pub fn handle_init(args: &InitArgs) -> Result<PathBuf, CliError> {
    let path = args.dir.join(CONFIG_FILENAME);
    if ExportConfig::exists(&args.dir) && !args.force {
        return Err(CliError::InvalidArgument(format!(
            "{} already exists (use --force to overwrite)",
            path.display()
        )));
    }

    std::fs::write(&path, sample_config())
        .map_err(|e| CliError::FileWriteError(path.clone(), e.to_string()))?;
    Ok(path)
}
