//! Import functionality
//!
//! Provides the XML document source for schema analysis and row export.

pub mod xml;

pub use xml::XMLImporter;

/// Error during import
#[derive(Debug, thiserror::Error, serde::Serialize, serde::Deserialize)]
pub enum ImportError {
    #[error("Parse error: {0}")]
    ParseError(String),
    #[error("IO error: {0}")]
    IoError(String),
}
