//! Canonical naming of tags and attributes
//!
//! Every component that tests membership in the checked set derives its
//! paths through [`name_for`]. Analysis and row export must use the same
//! `ignore_ns` value or checked paths will never match.

/// Characters that end a namespace qualifier: `}` closes a Clark-notation
/// URI, `:` ends a raw prefix.
pub const NAMESPACE_SEPARATORS: [char; 2] = ['}', ':'];

/// Separator between the segments of a canonical path
pub const PATH_SEPARATOR: char = '/';

/// Separator between the segments of an inlined column name
pub const FIELD_SEPARATOR: char = '.';

/// A canonical (name, path) pair
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QualifiedName {
    /// Tag or attribute name after namespace handling
    pub name: String,
    /// `parent_path/name`, or just `name` at the root
    pub path: String,
}

/// Strip the namespace qualifier from `raw` when `ignore_ns` is set
///
/// Everything up to and including the last separator is removed.
pub fn local_name(raw: &str, ignore_ns: bool) -> &str {
    if !ignore_ns {
        return raw;
    }
    match raw.rfind(NAMESPACE_SEPARATORS) {
        Some(index) => &raw[index + 1..],
        None => raw,
    }
}

/// Derive the canonical name and path of a tag or attribute
///
/// # Arguments
///
/// * `raw` - Tag or attribute name as reported by the importer
/// * `parent_path` - Canonical path of the owning element, empty at the root
/// * `ignore_ns` - Strip namespace qualifiers
///
/// # Example
///
/// ```rust
/// use xml2sql::schema::namer::name_for;
///
/// let qn = name_for("{urn:cat}Item", "Catalog", true);
/// assert_eq!(qn.name, "Item");
/// assert_eq!(qn.path, "Catalog/Item");
/// ```
pub fn name_for(raw: &str, parent_path: &str, ignore_ns: bool) -> QualifiedName {
    let name = local_name(raw, ignore_ns).to_string();
    let path = if parent_path.is_empty() {
        name.clone()
    } else {
        format!("{}{}{}", parent_path, PATH_SEPARATOR, name)
    };
    QualifiedName { name, path }
}

/// Column name of a field below an inlined prefix
pub fn prefix_field(name: &str, prefix: &str) -> String {
    format!("{}{}", prefix, name)
}

/// Prefix for the descendants of an inlined field
pub fn child_prefix(field: &str) -> String {
    format!("{}{}", field, FIELD_SEPARATOR)
}
