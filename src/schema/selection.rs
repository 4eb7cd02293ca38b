//! Selection model
//!
//! The checked-path set decides which schema nodes become their own tables.
//! A [`Selection`] file carries the set together with the namespace mode that
//! produced its paths.

use std::collections::BTreeSet;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use super::tree::SchemaTree;

/// Set of canonical paths marked as independent tables
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CheckedPaths(BTreeSet<String>);

impl CheckedPaths {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a path; returns `false` if it was already checked
    pub fn insert(&mut self, path: impl Into<String>) -> bool {
        self.0.insert(path.into())
    }

    /// Unmark a path; returns `false` if it was not checked
    pub fn remove(&mut self, path: &str) -> bool {
        self.0.remove(path)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.0.contains(path)
    }

    /// Flip a path and return its new state
    pub fn toggle(&mut self, path: &str) -> bool {
        if self.0.remove(path) {
            false
        } else {
            self.0.insert(path.to_string());
            true
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for CheckedPaths {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl<S: Into<String>> Extend<S> for CheckedPaths {
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        self.0.extend(iter.into_iter().map(Into::into));
    }
}

/// A persisted user selection
///
/// Stored as JSON:
///
/// ```json
/// { "ignore_ns": true, "checked": ["Catalog/Item"] }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    /// Namespace mode the checked paths were produced with
    #[serde(default)]
    pub ignore_ns: bool,
    /// Checked paths
    #[serde(default)]
    pub checked: CheckedPaths,
}

impl Selection {
    pub fn new(ignore_ns: bool, checked: CheckedPaths) -> Self {
        Self { ignore_ns, checked }
    }

    /// Load a selection file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read selection file: {}", path.display()))?;
        Self::parse(&content)
            .with_context(|| format!("Invalid selection file: {}", path.display()))
    }

    /// Parse a selection from JSON
    pub fn parse(content: &str) -> Result<Self> {
        serde_json::from_str(content).context("Failed to parse selection JSON")
    }

    /// Write the selection as pretty-printed JSON
    pub fn save(&self, path: &Path) -> Result<()> {
        let content =
            serde_json::to_string_pretty(self).context("Failed to serialize selection")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write selection file: {}", path.display()))
    }

    /// Checked paths that do not exist in `tree`
    ///
    /// A non-empty result usually means the selection was made on a
    /// different document or with a different namespace mode.
    pub fn unknown_paths<'a>(&'a self, tree: &SchemaTree) -> Vec<&'a str> {
        self.checked
            .iter()
            .filter(|path| tree.find(path).is_none())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_toggle() {
        let mut checked = CheckedPaths::new();
        assert!(checked.toggle("Root/Item"));
        assert!(checked.contains("Root/Item"));
        assert!(!checked.toggle("Root/Item"));
        assert!(checked.is_empty());
    }

    #[test]
    fn test_collect_and_extend() {
        let mut checked: CheckedPaths = ["b", "a"].into_iter().collect();
        checked.extend(vec!["c".to_string()]);
        assert_eq!(checked.iter().collect::<Vec<_>>(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_parse_selection() {
        let selection =
            Selection::parse(r#"{"ignore_ns": true, "checked": ["Root/Item"]}"#).unwrap();
        assert!(selection.ignore_ns);
        assert!(selection.checked.contains("Root/Item"));

        let defaults = Selection::parse("{}").unwrap();
        assert!(!defaults.ignore_ns);
        assert!(defaults.checked.is_empty());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("selection.json");
        let selection = Selection::new(false, ["Root/Item"].into_iter().collect());

        selection.save(&path).unwrap();
        let loaded = Selection::load(&path).unwrap();
        assert_eq!(loaded, selection);
    }

    #[test]
    fn test_unknown_paths() {
        let tree = SchemaTree::new("Root", "Root");
        let selection = Selection::new(false, ["Root", "Root/Missing"].into_iter().collect());
        assert_eq!(selection.unknown_paths(&tree), vec!["Root/Missing"]);
    }
}
