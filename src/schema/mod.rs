//! Schema inference
//!
//! Provides:
//! - Canonical path naming shared by analysis and export
//! - The schema tree built from one document
//! - The checked-path selection consumed by the generators

pub mod analyzer;
pub mod namer;
pub mod selection;
pub mod tree;

pub use analyzer::{Analysis, CollisionKind, NamingCollision, SchemaAnalyzer};
pub use namer::{QualifiedName, name_for};
pub use selection::{CheckedPaths, Selection};
pub use tree::{NodeId, NodeKind, SchemaNode, SchemaTree};
