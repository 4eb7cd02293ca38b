//! Export configuration file support
//!
//! Handles parsing of `.xml2sql.toml` configuration files and
//! environment variable overrides.

use serde::{Deserialize, Serialize};
use std::path::Path;

use super::{DatabaseError, DatabaseResult, Destination};
use crate::export::MappingOptions;

/// Default configuration filename
pub const CONFIG_FILENAME: &str = ".xml2sql.toml";

/// Environment variable for namespace stripping
pub const ENV_IGNORE_NS: &str = "XML2SQL_IGNORE_NS";

/// Environment variable for full-path table names
pub const ENV_FULL_NAME: &str = "XML2SQL_FULL_NAME";

/// Environment variable for the output destination
pub const ENV_DESTINATION: &str = "XML2SQL_DESTINATION";

/// Output configuration section
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutputSection {
    /// Destination descriptor (`-`, `file:///…`, `duckdb:///…`, `sqlite:///…`)
    #[serde(default)]
    pub destination: Destination,
}

/// Main configuration structure
///
/// Represents the `.xml2sql.toml` configuration file format.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Naming options
    #[serde(default)]
    pub mapping: MappingOptions,

    /// Output configuration
    #[serde(default)]
    pub output: OutputSection,
}

impl ExportConfig {
    /// Create a new default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from a directory
    ///
    /// Looks for `.xml2sql.toml` in `dir`. Falls back to defaults if not
    /// found. Environment overrides are applied either way.
    pub fn load(dir: &Path) -> DatabaseResult<Self> {
        let config_path = dir.join(CONFIG_FILENAME);

        let mut config = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)
                .map_err(|e| DatabaseError::IoError(format!("Failed to read config: {}", e)))?;

            Self::parse(&content)?
        } else {
            Self::default()
        };

        config.apply_env_overrides()?;

        Ok(config)
    }

    /// Parse configuration from TOML string
    pub fn parse(content: &str) -> DatabaseResult<Self> {
        toml::from_str(content)
            .map_err(|e| DatabaseError::ConfigError(format!("Failed to parse config: {}", e)))
    }

    /// Save configuration to a directory
    pub fn save(&self, dir: &Path) -> DatabaseResult<()> {
        let config_path = dir.join(CONFIG_FILENAME);
        let content = self.to_toml()?;

        std::fs::write(&config_path, content)
            .map_err(|e| DatabaseError::IoError(format!("Failed to write config: {}", e)))?;

        Ok(())
    }

    /// Convert configuration to TOML string
    pub fn to_toml(&self) -> DatabaseResult<String> {
        toml::to_string_pretty(self).map_err(|e| {
            DatabaseError::SerializationError(format!("Failed to serialize config: {}", e))
        })
    }

    /// Apply environment variable overrides
    pub fn apply_env_overrides(&mut self) -> DatabaseResult<()> {
        self.apply_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from any key/value lookup
    ///
    /// Unparseable flags are ignored; an unparseable destination is an error.
    pub fn apply_overrides_from(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> DatabaseResult<()> {
        if let Some(value) = lookup(ENV_IGNORE_NS)
            && let Some(flag) = parse_flag(&value)
        {
            self.mapping.ignore_ns = flag;
        }

        if let Some(value) = lookup(ENV_FULL_NAME)
            && let Some(flag) = parse_flag(&value)
        {
            self.mapping.full_name = flag;
        }

        if let Some(value) = lookup(ENV_DESTINATION) {
            self.output.destination = value.parse()?;
        }

        Ok(())
    }

    /// Configured destination
    pub fn destination(&self) -> &Destination {
        &self.output.destination
    }

    /// Check if configuration exists in a directory
    pub fn exists(dir: &Path) -> bool {
        dir.join(CONFIG_FILENAME).exists()
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Generate a sample configuration file content
pub fn sample_config() -> &'static str {
    r#"# xml2sql configuration

[mapping]
# Strip namespace qualifiers from tag and attribute names
ignore_ns = false

# Use the full canonical path as table name instead of the local label
full_name = false

[output]
# Where generated SQL goes:
#   "-"                    script on standard output
#   "file:///out.sql"      script file
#   "duckdb:///out.duckdb" DuckDB database (feature duckdb-backend)
#   "sqlite:///out.db"     SQLite database (feature sqlite-backend)
destination = "-"
"#
}
