//! Schema shapes and where their definitions come from

use std::fmt;
use std::path::PathBuf;

const OLD_SCHEMA_XSD: &str = include_str!("../schemas/OldSchema.xsd");
const NEW_SCHEMA_XSD: &str = include_str!("../schemas/NewSchema.xsd");

/// The two document shapes the mediator works with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemaShape {
    /// Input documents
    Old,
    /// Output documents
    New,
}

impl SchemaShape {
    /// Short identifier used in logs and errors
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Old => "old",
            Self::New => "new",
        }
    }

    /// File name of the bundled definition
    #[must_use]
    pub fn resource_name(self) -> &'static str {
        match self {
            Self::Old => "OldSchema.xsd",
            Self::New => "NewSchema.xsd",
        }
    }

    /// Bundled XSD text compiled into the binary
    #[must_use]
    pub fn bundled_definition(self) -> &'static str {
        match self {
            Self::Old => OLD_SCHEMA_XSD,
            Self::New => NEW_SCHEMA_XSD,
        }
    }
}

impl fmt::Display for SchemaShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Location of a schema definition
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SchemaSource {
    /// The definition bundled with the program
    #[default]
    Bundled,
    /// An XSD file on disk
    File(PathBuf),
    /// XSD text held in memory
    Inline(String),
}

impl SchemaSource {
    /// Human-readable description for logs
    #[must_use]
    pub fn describe(&self, shape: SchemaShape) -> String {
        match self {
            Self::Bundled => format!("bundled {}", shape.resource_name()),
            Self::File(path) => path.display().to_string(),
            Self::Inline(_) => "inline definition".to_string(),
        }
    }
}

/// One source per schema shape
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaSources {
    pub old: SchemaSource,
    pub new: SchemaSource,
}

impl SchemaSources {
    /// Both shapes from the bundled definitions
    #[must_use]
    pub fn bundled() -> Self {
        Self::default()
    }

    /// Source configured for a shape
    #[must_use]
    pub fn get(&self, shape: SchemaShape) -> &SchemaSource {
        match shape {
            SchemaShape::Old => &self.old,
            SchemaShape::New => &self.new,
        }
    }
}
