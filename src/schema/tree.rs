//! Schema tree arena
//!
//! One [`SchemaNode`] per distinct child name under a parent path. Nodes live
//! in a flat arena and refer to their children by [`NodeId`], so selection
//! and display layers can hold ids without aliasing the analyzer's tree.

use serde::{Deserialize, Serialize};

use super::selection::CheckedPaths;

/// Index of a node inside a [`SchemaTree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(usize);

impl NodeId {
    /// Position in the arena
    pub fn index(self) -> usize {
        self.0
    }
}

/// Whether a node was first seen as an element or an attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Element,
    Attribute,
}

/// One distinct child name observed under one parent path
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaNode {
    /// Clean tag or attribute name
    pub label: String,
    /// Canonical path, unique within the tree
    pub path: String,
    /// Element or attribute (first sighting wins)
    pub kind: NodeKind,
    /// Number of sightings under this parent path
    pub occurrence_count: usize,
    /// Two or more siblings of this name under one parent instance
    pub repeats: bool,
    /// Children in first-encounter order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NodeId>,
}

impl SchemaNode {
    fn new(label: &str, path: &str, kind: NodeKind) -> Self {
        Self {
            label: label.to_string(),
            path: path.to_string(),
            kind,
            occurrence_count: 1,
            repeats: false,
            children: Vec::new(),
        }
    }

    /// Label decorated with occurrence information
    ///
    /// `Item: [3]` for a repeating node, `Item: (3)` for a node seen several
    /// times without ever repeating inside one parent, `Item` otherwise.
    pub fn display_label(&self) -> String {
        if self.repeats {
            format!("{}: [{}]", self.label, self.occurrence_count)
        } else if self.occurrence_count > 1 {
            format!("{}: ({})", self.label, self.occurrence_count)
        } else {
            self.label.clone()
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// Generalized path tree of one analyzed document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaTree {
    nodes: Vec<SchemaNode>,
    root: NodeId,
}

impl SchemaTree {
    /// Create a tree holding only the root node
    pub fn new(label: &str, path: &str) -> Self {
        Self {
            nodes: vec![SchemaNode::new(label, path, NodeKind::Element)],
            root: NodeId(0),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Get a node by id
    ///
    /// Ids are only handed out by this tree, so indexing cannot go out of
    /// bounds for ids obtained from it.
    pub fn node(&self, id: NodeId) -> &SchemaNode {
        &self.nodes[id.0]
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut SchemaNode {
        &mut self.nodes[id.0]
    }

    /// Children of a node in first-encounter order
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    /// Number of nodes, root included
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Find a direct child by label or create it
    ///
    /// A hit increments the existing node's occurrence count instead of
    /// creating a duplicate sibling.
    pub(crate) fn find_or_insert_child(
        &mut self,
        parent: NodeId,
        label: &str,
        path: &str,
        kind: NodeKind,
    ) -> NodeId {
        let existing = self.nodes[parent.0]
            .children
            .iter()
            .copied()
            .find(|child| self.nodes[child.0].label == label);

        match existing {
            Some(child) => {
                self.nodes[child.0].occurrence_count += 1;
                child
            }
            None => {
                let child = NodeId(self.nodes.len());
                self.nodes.push(SchemaNode::new(label, path, kind));
                self.nodes[parent.0].children.push(child);
                child
            }
        }
    }

    /// Find a node by canonical path
    pub fn find(&self, path: &str) -> Option<NodeId> {
        self.nodes
            .iter()
            .position(|node| node.path == path)
            .map(NodeId)
    }

    /// All nodes in depth-first pre-order with their depth
    pub fn walk(&self) -> Vec<(usize, NodeId)> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![(0, self.root)];
        while let Some((depth, id)) = stack.pop() {
            out.push((depth, id));
            for child in self.children(id).iter().rev() {
                stack.push((depth + 1, *child));
            }
        }
        out
    }

    /// Paths of every repeating node, in pre-order
    pub fn repeating_paths(&self) -> Vec<&str> {
        self.walk()
            .into_iter()
            .map(|(_, id)| self.node(id))
            .filter(|node| node.repeats)
            .map(|node| node.path.as_str())
            .collect()
    }

    /// Render the tree as an indented checklist
    ///
    /// ```text
    /// [x] Root
    ///   [x] Item: [2]
    ///     [ ] id: (2)
    /// ```
    ///
    /// The root is always a table and is shown checked.
    pub fn render(&self, checked: &CheckedPaths) -> String {
        let mut out = String::new();
        for (depth, id) in self.walk() {
            let node = self.node(id);
            let mark = if id == self.root || checked.contains(&node.path) {
                "[x]"
            } else {
                "[ ]"
            };
            let attr = match node.kind {
                NodeKind::Attribute => "@",
                NodeKind::Element => "",
            };
            out.push_str(&format!(
                "{}{} {}{}\n",
                "  ".repeat(depth),
                mark,
                attr,
                node.display_label()
            ));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> SchemaTree {
        let mut tree = SchemaTree::new("Root", "Root");
        let root = tree.root();
        let item = tree.find_or_insert_child(root, "Item", "Root/Item", NodeKind::Element);
        tree.find_or_insert_child(item, "id", "Root/Item/id", NodeKind::Attribute);
        tree.find_or_insert_child(root, "Item", "Root/Item", NodeKind::Element);
        tree.node_mut(item).repeats = true;
        tree
    }

    #[test]
    fn test_find_or_insert_merges_same_label() {
        let tree = sample();
        assert_eq!(tree.len(), 3);
        assert_eq!(tree.children(tree.root()).len(), 1);

        let item = tree.find("Root/Item").unwrap();
        assert_eq!(tree.node(item).occurrence_count, 2);
    }

    #[test]
    fn test_display_label() {
        let mut node = SchemaNode::new("Item", "Root/Item", NodeKind::Element);
        assert_eq!(node.display_label(), "Item");
        node.occurrence_count = 3;
        assert_eq!(node.display_label(), "Item: (3)");
        node.repeats = true;
        assert_eq!(node.display_label(), "Item: [3]");
        assert_eq!(node.label, "Item");
    }

    #[test]
    fn test_walk_is_preorder() {
        let tree = sample();
        let paths: Vec<&str> = tree
            .walk()
            .into_iter()
            .map(|(_, id)| tree.node(id).path.as_str())
            .collect();
        assert_eq!(paths, vec!["Root", "Root/Item", "Root/Item/id"]);
        assert_eq!(tree.repeating_paths(), vec!["Root/Item"]);
    }

    #[test]
    fn test_render() {
        let tree = sample();
        let mut checked = CheckedPaths::new();
        checked.insert("Root/Item");

        let rendered = tree.render(&checked);
        assert_eq!(rendered, "[x] Root\n  [x] Item: [2]\n    [ ] @id\n");
    }
}
