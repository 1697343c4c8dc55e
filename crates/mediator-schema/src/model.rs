//! Schema model definitions

use crate::bundled::SchemaShape;
use regex::Regex;

/// A loaded schema
#[derive(Debug, Clone)]
pub struct Schema {
    pub shape: SchemaShape,
    /// Where the definition was loaded from
    pub origin: String,
    /// Global element declarations, each a candidate document root
    pub elements: Vec<ElementDecl>,
}

/// Declaration of an element
#[derive(Debug, Clone)]
pub struct ElementDecl {
    pub name: String,
    pub min_occurs: usize,
    /// `None` means unbounded
    pub max_occurs: Option<usize>,
    pub content: ContentModel,
}

/// What an element may contain
#[derive(Debug, Clone)]
pub enum ContentModel {
    /// Character data of a simple type, no child elements
    Simple(SimpleType),
    /// Child elements in the given order, no character data
    Sequence(Vec<ElementDecl>),
}

/// A built-in datatype narrowed by facets
#[derive(Debug, Clone)]
pub struct SimpleType {
    /// Name of a named simple type, `None` for anonymous or built-in types
    pub name: Option<String>,
    pub base: DataType,
    pub facets: Facets,
}

/// Constraining facets of a simple type
#[derive(Debug, Clone, Default)]
pub struct Facets {
    /// Every pattern must match; alternatives declared in one restriction
    /// step are already folded into a single pattern
    pub patterns: Vec<Pattern>,
    pub length: Option<usize>,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub enumeration: Vec<String>,
}

/// A compiled `xs:pattern` facet, anchored at both ends
#[derive(Debug, Clone)]
pub struct Pattern {
    /// Pattern as written in the schema
    pub source: String,
    pub regex: Regex,
}

/// Built-in XML Schema datatypes understood by the validator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
    String,
    NormalizedString,
    Token,
    DateTime,
    Date,
    Integer,
    Int,
    Long,
    Decimal,
    Boolean,
}

impl Schema {
    /// Find a global element declaration by name
    #[must_use]
    pub fn element(&self, name: &str) -> Option<&ElementDecl> {
        self.elements.iter().find(|e| e.name == name)
    }

    /// Names of all global elements
    #[must_use]
    pub fn root_names(&self) -> Vec<&str> {
        self.elements.iter().map(|e| e.name.as_str()).collect()
    }
}

impl ElementDecl {
    /// Whether the element must appear at least once
    #[must_use]
    pub fn is_required(&self) -> bool {
        self.min_occurs > 0
    }

    /// Child declarations, empty for simple content
    #[must_use]
    pub fn children(&self) -> &[ElementDecl] {
        match &self.content {
            ContentModel::Sequence(children) => children,
            ContentModel::Simple(_) => &[],
        }
    }

    /// Find a child declaration by name
    #[must_use]
    pub fn child(&self, name: &str) -> Option<&ElementDecl> {
        self.children().iter().find(|c| c.name == name)
    }
}

impl SimpleType {
    /// Unrestricted built-in type
    #[must_use]
    pub fn builtin(base: DataType) -> Self {
        Self {
            name: None,
            base,
            facets: Facets::default(),
        }
    }
}

impl Facets {
    /// Whether no facet is set
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
            && self.length.is_none()
            && self.min_length.is_none()
            && self.max_length.is_none()
            && self.enumeration.is_empty()
    }
}

impl Pattern {
    /// Compile an XSD pattern. XSD patterns always match the whole value.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Pattern`] if the expression does not compile.
    pub fn compile(source: impl Into<String>) -> crate::Result<Self> {
        let source = source.into();
        let regex = Regex::new(&format!("^(?:{source})$")).map_err(|e| crate::Error::Pattern {
            pattern: source.clone(),
            message: e.to_string(),
        })?;
        Ok(Self { source, regex })
    }

    /// Whether `value` matches the whole pattern
    #[must_use]
    pub fn is_match(&self, value: &str) -> bool {
        self.regex.is_match(value)
    }
}

impl DataType {
    /// Map the local part of a built-in type name (e.g. `dateTime`)
    #[must_use]
    pub fn from_xsd_name(name: &str) -> Option<Self> {
        let data_type = match name {
            "string" => Self::String,
            "normalizedString" => Self::NormalizedString,
            "token" => Self::Token,
            "dateTime" => Self::DateTime,
            "date" => Self::Date,
            "integer" => Self::Integer,
            "int" => Self::Int,
            "long" => Self::Long,
            "decimal" => Self::Decimal,
            "boolean" => Self::Boolean,
            _ => return None,
        };
        Some(data_type)
    }

    /// XSD name of the type
    #[must_use]
    pub fn xsd_name(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::NormalizedString => "normalizedString",
            Self::Token => "token",
            Self::DateTime => "dateTime",
            Self::Date => "date",
            Self::Integer => "integer",
            Self::Int => "int",
            Self::Long => "long",
            Self::Decimal => "decimal",
            Self::Boolean => "boolean",
        }
    }

    /// Whether surrounding whitespace is collapsed before checking the value
    #[must_use]
    pub fn collapses_whitespace(self) -> bool {
        !matches!(self, Self::String | Self::NormalizedString)
    }
}
