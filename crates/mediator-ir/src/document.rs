//! Document representation
#![allow(clippy::must_use_candidate)]

use crate::node::Node;
use serde::{Deserialize, Serialize};

/// A parsed or constructed XML document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Root element of the document
    pub root: Node,

    /// Document-level metadata
    pub metadata: DocumentMetadata,
}

/// Metadata associated with a document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentMetadata {
    /// XML declaration as read from the input
    pub declaration: Option<Declaration>,
}

/// Contents of an `<?xml ...?>` declaration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Declaration {
    pub version: String,
    pub encoding: Option<String>,
    pub standalone: Option<String>,
}

impl Default for Declaration {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            encoding: Some("UTF-8".to_string()),
            standalone: Some("yes".to_string()),
        }
    }
}

impl Document {
    /// Create a new document with the given root element
    pub fn new(root: Node) -> Self {
        Self {
            root,
            metadata: DocumentMetadata::default(),
        }
    }

    /// Create a new document with metadata
    pub fn with_metadata(root: Node, metadata: DocumentMetadata) -> Self {
        Self { root, metadata }
    }

    /// Name of the root element
    pub fn root_name(&self) -> &str {
        &self.root.name
    }
}
