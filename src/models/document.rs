//! Parsed XML document model
//!
//! An owned element tree handed to the analyzer and the insert generator.
//! Names are already namespace-resolved by the importer (Clark notation
//! `{uri}local` for bound namespaces).

use serde::{Deserialize, Serialize};

/// A single attribute in document order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct XmlAttribute {
    /// Attribute name (`{uri}local` when namespaced)
    pub name: String,
    /// Unescaped attribute value
    pub value: String,
}

/// One element of a parsed document
///
/// # Example
///
/// ```rust
/// use xml2sql::models::XmlElement;
///
/// let root = XmlElement::new("Root")
///     .with_child(XmlElement::new("Item").with_text("A"))
///     .with_child(XmlElement::new("Item").with_text("B"));
///
/// assert_eq!(root.children.len(), 2);
/// assert_eq!(root.children[0].trimmed_text(), Some("A"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct XmlElement {
    /// Element tag (`{uri}local` when namespaced)
    pub tag: String,
    /// Attributes in document order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<XmlAttribute>,
    /// Child elements in document order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<XmlElement>,
    /// Direct character data, concatenated and unescaped
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub text: String,
}

impl XmlElement {
    /// Create an empty element with the given tag
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Default::default()
        }
    }

    /// Builder: append an attribute
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push(XmlAttribute {
            name: name.into(),
            value: value.into(),
        });
        self
    }

    /// Builder: append a child element
    pub fn with_child(mut self, child: XmlElement) -> Self {
        self.children.push(child);
        self
    }

    /// Builder: append character data
    pub fn with_text(mut self, text: impl AsRef<str>) -> Self {
        self.text.push_str(text.as_ref());
        self
    }

    /// Direct text with surrounding whitespace removed, `None` when blank
    pub fn trimmed_text(&self) -> Option<&str> {
        let text = self.text.trim();
        if text.is_empty() { None } else { Some(text) }
    }

    /// Number of elements in this subtree, including `self`
    pub fn element_count(&self) -> usize {
        1 + self
            .children
            .iter()
            .map(XmlElement::element_count)
            .sum::<usize>()
    }
}

/// A parsed XML document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct XmlDocument {
    /// Document element
    pub root: XmlElement,
}
