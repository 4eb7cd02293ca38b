//! Schema analyzer
//!
//! Walks one document and builds the generalized path tree. Repetition is
//! detected per parent instance: two same-named children of one element mark
//! the node as repeating, and repeating nodes are pre-checked so lists become
//! their own tables by default.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::namer::name_for;
use super::selection::CheckedPaths;
use super::tree::{NodeId, NodeKind, SchemaTree};
use crate::models::XmlElement;

/// How two sibling names ended up on the same canonical path
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CollisionKind {
    /// An attribute and a child element of one element share a name
    AttributeElement,
    /// Two different qualified tags map to one name after namespace stripping
    Namespace { first: String, second: String },
}

/// A naming collision found during analysis
///
/// Colliding siblings are merged into one schema node (first sighting wins),
/// which can inflate counts and fold unrelated values into one column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamingCollision {
    /// Canonical path both names resolve to
    pub path: String,
    #[serde(flatten)]
    pub kind: CollisionKind,
}

impl std::fmt::Display for NamingCollision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.kind {
            CollisionKind::AttributeElement => {
                write!(f, "{}: attribute and element share this path", self.path)
            }
            CollisionKind::Namespace { first, second } => {
                write!(f, "{}: '{}' and '{}' share this path", self.path, first, second)
            }
        }
    }
}

/// Result of analyzing a document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Analysis {
    /// Generalized path tree
    pub tree: SchemaTree,
    /// Default selection: every repeating node
    pub checked: CheckedPaths,
    /// Naming collisions, one entry per path and kind
    pub collisions: Vec<NamingCollision>,
}

/// Builds a [`SchemaTree`] from a document
#[derive(Debug, Clone, Copy, Default)]
pub struct SchemaAnalyzer {
    ignore_ns: bool,
}

/// First sibling seen on a path within one parent instance
struct Sighting<'a> {
    kind: NodeKind,
    raw: &'a str,
}

impl SchemaAnalyzer {
    /// Create an analyzer
    ///
    /// # Arguments
    ///
    /// * `ignore_ns` - Strip namespace qualifiers from names. The same value
    ///   must be used when exporting rows against the resulting selection.
    pub fn new(ignore_ns: bool) -> Self {
        Self { ignore_ns }
    }

    pub fn ignore_ns(&self) -> bool {
        self.ignore_ns
    }

    /// Analyze a document
    ///
    /// # Example
    ///
    /// ```rust
    /// use xml2sql::import::XMLImporter;
    /// use xml2sql::schema::SchemaAnalyzer;
    ///
    /// let doc = XMLImporter::new()
    ///     .parse("<Root><Item>A</Item><Item>B</Item></Root>")
    ///     .unwrap();
    /// let analysis = SchemaAnalyzer::new(false).analyze(&doc.root);
    ///
    /// assert!(analysis.checked.contains("Root/Item"));
    /// ```
    pub fn analyze(&self, root: &XmlElement) -> Analysis {
        let root_name = name_for(&root.tag, "", self.ignore_ns);
        let mut tree = SchemaTree::new(&root_name.name, &root_name.path);
        let mut collisions = Vec::new();

        let target = tree.root();
        self.analyze_element(root, &root_name.path, target, &mut tree, &mut collisions);

        let checked: CheckedPaths = tree.repeating_paths().into_iter().collect();

        info!(
            "Analyzed <{}>: {} schema nodes, {} repeating, {} collisions",
            root_name.name,
            tree.len(),
            checked.len(),
            collisions.len()
        );

        Analysis {
            tree,
            checked,
            collisions,
        }
    }

    fn analyze_element(
        &self,
        element: &XmlElement,
        parent_path: &str,
        target: NodeId,
        tree: &mut SchemaTree,
        collisions: &mut Vec<NamingCollision>,
    ) {
        let mut seen: HashMap<String, Sighting<'_>> = HashMap::new();

        for attr in &element.attributes {
            let qn = name_for(&attr.name, parent_path, self.ignore_ns);
            let child = tree.find_or_insert_child(target, &qn.name, &qn.path, NodeKind::Attribute);
            Self::record_sighting(
                &mut seen,
                qn.path,
                NodeKind::Attribute,
                &attr.name,
                child,
                tree,
                collisions,
            );
        }

        for node in &element.children {
            let qn = name_for(&node.tag, parent_path, self.ignore_ns);
            let child = tree.find_or_insert_child(target, &qn.name, &qn.path, NodeKind::Element);
            Self::record_sighting(
                &mut seen,
                qn.path.clone(),
                NodeKind::Element,
                &node.tag,
                child,
                tree,
                collisions,
            );

            self.analyze_element(node, &qn.path, child, tree, collisions);
        }
    }

    fn record_sighting<'a>(
        seen: &mut HashMap<String, Sighting<'a>>,
        path: String,
        kind: NodeKind,
        raw: &'a str,
        node: NodeId,
        tree: &mut SchemaTree,
        collisions: &mut Vec<NamingCollision>,
    ) {
        if !seen.contains_key(&path) {
            seen.insert(path, Sighting { kind, raw });
            return;
        }
        let first = &seen[&path];

        let collision = if first.kind != kind {
            // Not a list: the attribute and the element are different things
            Some(CollisionKind::AttributeElement)
        } else {
            if !tree.node(node).repeats {
                debug!("Repeating node: {}", path);
            }
            tree.node_mut(node).repeats = true;
            (first.raw != raw).then(|| CollisionKind::Namespace {
                first: first.raw.to_string(),
                second: raw.to_string(),
            })
        };

        if let Some(kind) = collision {
            let collision = NamingCollision { path, kind };
            if !collisions.contains(&collision) {
                warn!("Naming collision at {}", collision);
                collisions.push(collision);
            }
        }
    }
}
