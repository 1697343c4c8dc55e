//! Element tree nodes

use crate::metadata::Position;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// An element in the tree
///
/// Text content is kept verbatim; whitespace between child elements is
/// dropped by the reader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    /// Qualified element name as written (e.g. `newid`, `xs:element`)
    pub name: String,

    /// Character data directly inside this element
    pub text: Option<String>,

    /// Child elements in document order
    pub children: Vec<Node>,

    /// Attributes keyed by qualified name
    pub attributes: BTreeMap<String, String>,

    /// Where the start tag was found (reader-built nodes only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
}

impl Node {
    /// Create a new empty element
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: None,
            children: Vec::new(),
            attributes: BTreeMap::new(),
            position: None,
        }
    }

    /// Create an element holding only text
    pub fn with_text(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::new(name)
        }
    }

    /// Add a child element
    pub fn add_child(&mut self, child: Node) -> &mut Self {
        self.children.push(child);
        self
    }

    /// Add a text child only when a value is present
    pub fn add_optional_text(&mut self, name: &str, text: Option<&str>) -> &mut Self {
        if let Some(text) = text {
            self.children.push(Node::with_text(name, text));
        }
        self
    }

    /// Set an attribute
    pub fn set_attribute(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Append character data, concatenating with existing text
    pub fn push_text(&mut self, text: &str) {
        match &mut self.text {
            Some(existing) => existing.push_str(text),
            None => self.text = Some(text.to_string()),
        }
    }

    /// Name without its namespace prefix
    pub fn local_name(&self) -> &str {
        local_name(&self.name)
    }

    /// Text content, or an empty string when the element is empty
    pub fn text_or_empty(&self) -> &str {
        self.text.as_deref().unwrap_or("")
    }

    /// Whether this element carries non-whitespace character data
    pub fn has_significant_text(&self) -> bool {
        self.text.as_deref().is_some_and(|t| !t.trim().is_empty())
    }

    /// Find the first child by name
    pub fn find_child(&self, name: &str) -> Option<&Node> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Text of the first child with the given name
    pub fn child_text(&self, name: &str) -> Option<&str> {
        self.find_child(name).map(Node::text_or_empty)
    }

    /// Resolve a slash-separated path of child names (e.g. `olddata/oldvalue`)
    pub fn find_path(&self, path: &str) -> Option<&Node> {
        path.split('/')
            .filter(|segment| !segment.is_empty())
            .try_fold(self, |node, segment| node.find_child(segment))
    }
}

/// Strip a namespace prefix from a qualified name.
pub fn local_name(qualified: &str) -> &str {
    qualified
        .rsplit_once(':')
        .map_or(qualified, |(_, local)| local)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Node {
        let mut root = Node::new("oldschema");
        root.add_child(Node::with_text("oldid", "1234"));
        let mut data = Node::new("olddata");
        data.add_child(Node::with_text("oldvalue", "abcdef"));
        root.add_child(data);
        root
    }

    #[test]
    fn test_find_child() {
        let root = sample();
        assert_eq!(root.child_text("oldid"), Some("1234"));
        assert!(root.find_child("oldname").is_none());
    }

    #[test]
    fn test_find_path() {
        let root = sample();
        let value = root.find_path("olddata/oldvalue").unwrap();
        assert_eq!(value.text.as_deref(), Some("abcdef"));
        assert!(root.find_path("olddata/oldtime").is_none());
        assert_eq!(root.find_path("").unwrap().name, "oldschema");
    }

    #[test]
    fn test_add_optional_text() {
        let mut node = Node::new("newschema");
        node.add_optional_text("newid", Some("1"))
            .add_optional_text("newname", None);
        assert_eq!(node.children.len(), 1);
        assert_eq!(node.children[0].name, "newid");
    }

    #[test]
    fn test_push_text_concatenates() {
        let mut node = Node::new("v");
        node.push_text("ab");
        node.push_text("cd");
        assert_eq!(node.text.as_deref(), Some("abcd"));
    }

    #[test]
    fn test_local_name() {
        assert_eq!(local_name("xs:element"), "element");
        assert_eq!(local_name("element"), "element");
        assert_eq!(Node::new("xsd:schema").local_name(), "schema");
    }

    #[test]
    fn test_significant_text() {
        assert!(!Node::with_text("a", "  \n ").has_significant_text());
        assert!(Node::with_text("a", " x ").has_significant_text());
        assert!(!Node::new("a").has_significant_text());
    }
}
