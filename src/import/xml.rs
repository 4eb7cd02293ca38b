//! XML importer
//!
//! Parses XML text into an owned [`XmlDocument`] using quick-xml's namespace
//! aware reader. Bound element and attribute names are reported in Clark
//! notation (`{uri}local`); names with an undeclared prefix keep their raw
//! `prefix:local` spelling. Namespace declarations are not attributes.

use std::borrow::Cow;
use std::path::Path;

use quick_xml::NsReader;
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::{QName, ResolveResult};
use tracing::debug;

use super::ImportError;
use crate::models::{XmlAttribute, XmlDocument, XmlElement};

/// XML Importer
///
/// Produces the document tree consumed by the schema analyzer and the
/// insert generator. The input must be well-formed; any reader error is
/// reported before a partial tree can escape.
#[derive(Debug, Default)]
pub struct XMLImporter;

impl XMLImporter {
    /// Create a new XMLImporter
    pub fn new() -> Self {
        Self
    }

    /// Read and parse an XML file
    pub fn parse_file(&self, path: impl AsRef<Path>) -> Result<XmlDocument, ImportError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            ImportError::IoError(format!("Failed to read {}: {}", path.display(), e))
        })?;
        self.parse(&content)
    }

    /// Parse XML content into a document tree
    ///
    /// # Arguments
    ///
    /// * `xml_content` - The XML document as a string.
    ///
    /// # Returns
    ///
    /// The parsed document, or `ImportError::ParseError` if the content is
    /// not well-formed.
    pub fn parse(&self, xml_content: &str) -> Result<XmlDocument, ImportError> {
        let mut reader = NsReader::from_str(xml_content);
        reader.config_mut().trim_text(false);

        let mut stack: Vec<XmlElement> = Vec::new();
        let mut root: Option<XmlElement> = None;

        loop {
            let event = reader.read_event().map_err(|e| {
                ImportError::ParseError(format!(
                    "XML parsing error at position {}: {}",
                    reader.buffer_position(),
                    e
                ))
            })?;

            match event {
                Event::Start(start) => {
                    if root.is_some() && stack.is_empty() {
                        return Err(ImportError::ParseError(
                            "Content found after the document element".to_string(),
                        ));
                    }
                    let element = Self::open_element(&reader, &start)?;
                    stack.push(element);
                }
                Event::Empty(start) => {
                    let element = Self::open_element(&reader, &start)?;
                    Self::attach(&mut stack, &mut root, element)?;
                }
                Event::End(_) => {
                    let element = stack.pop().ok_or_else(|| {
                        ImportError::ParseError("Unexpected closing tag".to_string())
                    })?;
                    Self::attach(&mut stack, &mut root, element)?;
                }
                Event::Text(text) => {
                    let text = text
                        .unescape()
                        .map_err(|e| ImportError::ParseError(format!("Invalid text: {}", e)))?;
                    Self::push_text(&mut stack, &text)?;
                }
                Event::CData(cdata) => {
                    let bytes = cdata.into_inner();
                    Self::push_text(&mut stack, &String::from_utf8_lossy(&bytes))?;
                }
                Event::Eof => break,
                // Declarations, comments, processing instructions, doctype
                _ => {}
            }
        }

        if let Some(open) = stack.last() {
            return Err(ImportError::ParseError(format!(
                "Unclosed element <{}>",
                open.tag
            )));
        }

        let root = root.ok_or_else(|| {
            ImportError::ParseError("Document has no root element".to_string())
        })?;
        debug!(
            "Parsed XML document <{}> with {} elements",
            root.tag,
            root.element_count()
        );
        Ok(XmlDocument { root })
    }

    fn open_element<'a>(
        reader: &NsReader<&'a [u8]>,
        start: &BytesStart<'a>,
    ) -> Result<XmlElement, ImportError> {
        let (resolved, local) = reader.resolve_element(start.name());
        let tag = Self::qualified_name(resolved, local.as_ref(), start.name());

        let mut attributes = Vec::new();
        for attr in start.attributes() {
            let attr = attr
                .map_err(|e| ImportError::ParseError(format!("Invalid attribute: {}", e)))?;
            if attr.key.as_namespace_binding().is_some() {
                continue;
            }
            let (resolved, local) = reader.resolve_attribute(attr.key);
            let name = Self::qualified_name(resolved, local.as_ref(), attr.key);
            let value = attr.unescape_value().map_err(|e| {
                ImportError::ParseError(format!("Invalid value for attribute {}: {}", name, e))
            })?;
            attributes.push(XmlAttribute {
                name,
                value: value.into_owned(),
            });
        }

        Ok(XmlElement {
            tag,
            attributes,
            children: Vec::new(),
            text: String::new(),
        })
    }

    fn qualified_name(resolved: ResolveResult, local: &[u8], raw: QName) -> String {
        match resolved {
            ResolveResult::Bound(ns) => format!(
                "{{{}}}{}",
                String::from_utf8_lossy(ns.as_ref()),
                String::from_utf8_lossy(local)
            ),
            ResolveResult::Unbound => String::from_utf8_lossy(local).into_owned(),
            ResolveResult::Unknown(_) => String::from_utf8_lossy(raw.as_ref()).into_owned(),
        }
    }

    fn attach(
        stack: &mut [XmlElement],
        root: &mut Option<XmlElement>,
        element: XmlElement,
    ) -> Result<(), ImportError> {
        if let Some(parent) = stack.last_mut() {
            parent.children.push(element);
        } else if root.is_some() {
            return Err(ImportError::ParseError(
                "Document has more than one root element".to_string(),
            ));
        } else {
            *root = Some(element);
        }
        Ok(())
    }

    fn push_text(stack: &mut [XmlElement], text: &Cow<'_, str>) -> Result<(), ImportError> {
        match stack.last_mut() {
            Some(current) => current.text.push_str(text),
            None if text.trim().is_empty() => {}
            None => {
                return Err(ImportError::ParseError(
                    "Text found outside the document element".to_string(),
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_elements_attributes_and_text() {
        let xml = r#"<?xml version="1.0"?>
<Root version="2">
  <Item id="1">A &amp; B</Item>
  <Item/>
  <Note><![CDATA[<raw>]]></Note>
</Root>"#;
        let doc = XMLImporter::new().parse(xml).unwrap();
        let root = doc.root;

        assert_eq!(root.tag, "Root");
        assert_eq!(root.attributes[0].name, "version");
        assert_eq!(root.attributes[0].value, "2");
        assert_eq!(root.children.len(), 3);
        assert_eq!(root.children[0].trimmed_text(), Some("A & B"));
        assert_eq!(root.children[0].attributes[0].value, "1");
        assert!(root.children[1].children.is_empty());
        assert_eq!(root.children[2].trimmed_text(), Some("<raw>"));
    }

    #[test]
    fn test_namespaces_use_clark_notation() {
        let xml = r#"<c:Catalog xmlns:c="urn:cat" xmlns:x="urn:x" x:lang="de"><c:Item/><plain/></c:Catalog>"#;
        let root = XMLImporter::new().parse(xml).unwrap().root;

        assert_eq!(root.tag, "{urn:cat}Catalog");
        assert_eq!(root.attributes.len(), 1);
        assert_eq!(root.attributes[0].name, "{urn:x}lang");
        assert_eq!(root.children[0].tag, "{urn:cat}Item");
        assert_eq!(root.children[1].tag, "plain");
    }

    #[test]
    fn test_default_namespace_applies_to_elements_only() {
        let xml = r#"<Root xmlns="urn:d" kind="k"><Item/></Root>"#;
        let root = XMLImporter::new().parse(xml).unwrap().root;

        assert_eq!(root.tag, "{urn:d}Root");
        assert_eq!(root.attributes[0].name, "kind");
        assert_eq!(root.children[0].tag, "{urn:d}Item");
    }

    #[test]
    fn test_malformed_documents_are_rejected() {
        let importer = XMLImporter::new();
        assert!(importer.parse("<a><b></a>").is_err());
        assert!(importer.parse("<a>").is_err());
        assert!(importer.parse("").is_err());
        assert!(importer.parse("<a/><b/>").is_err());
        assert!(importer.parse("<a/>text").is_err());
    }
}
