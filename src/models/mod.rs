//! Models module
//!
//! Defines the parsed document tree shared by the analyzer and the
//! generators.

pub mod document;

pub use document::{XmlAttribute, XmlDocument, XmlElement};
