//! XSD schema loader

use crate::bundled::{SchemaShape, SchemaSource};
use crate::model::{ContentModel, DataType, ElementDecl, Pattern, Schema, SimpleType};
use crate::{Error, Result, XSD_NAMESPACE};
use mediator_ir::{Node, XmlReader};
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info, trace};

/// Loads schema definitions into [`Schema`] values
#[derive(Debug, Default)]
pub struct SchemaLoader;

impl SchemaLoader {
    /// Create a new schema loader
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Load the schema for `shape` from `source`.
    ///
    /// # Errors
    ///
    /// Returns an error when the definition cannot be read, is not
    /// well-formed, or uses constructs outside the supported subset.
    pub fn load(&self, shape: SchemaShape, source: &SchemaSource) -> Result<Schema> {
        let origin = source.describe(shape);
        info!("Loading {} schema from {}", shape, origin);

        let schema = match source {
            SchemaSource::Bundled => {
                self.load_from_str(shape, shape.bundled_definition(), origin)
            }
            SchemaSource::File(path) => self.load_from_file(shape, path),
            SchemaSource::Inline(text) => self.load_from_str(shape, text, origin),
        }?;

        debug!(
            "Loaded {} schema with global elements {:?}",
            shape,
            schema.root_names()
        );
        Ok(schema)
    }

    /// Load the bundled definition of a shape
    ///
    /// # Errors
    ///
    /// Returns an error if the bundled definition fails to compile.
    pub fn load_bundled(&self, shape: SchemaShape) -> Result<Schema> {
        self.load(shape, &SchemaSource::Bundled)
    }

    /// Load a schema from an XSD file
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] for a missing file, [`Error::Io`] for
    /// other read failures, and compile errors as for [`Self::load_from_str`].
    pub fn load_from_file(&self, shape: SchemaShape, path: &Path) -> Result<Schema> {
        trace!("Loading schema from file: {:?}", path);
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::NotFound(path.display().to_string())
            } else {
                Error::Io {
                    path: path.to_path_buf(),
                    source: e,
                }
            }
        })?;

        self.load_from_str(shape, &content, path.display().to_string())
    }

    /// Compile XSD text
    ///
    /// # Errors
    ///
    /// Returns an error when the text is not well-formed XML or not a
    /// schema within the supported subset.
    pub fn load_from_str(
        &self,
        shape: SchemaShape,
        xsd: &str,
        origin: impl Into<String>,
    ) -> Result<Schema> {
        let document = XmlReader::new().read(xsd.as_bytes())?;
        let mut compiler = Compiler::new(&document.root)?;
        let elements = compiler.global_elements()?;

        Ok(Schema {
            shape,
            origin: origin.into(),
            elements,
        })
    }
}

enum Resolved<'a> {
    Builtin(DataType),
    Simple(&'a Node, &'a str),
    Complex(&'a Node, &'a str),
}

/// Walks an XSD element tree and builds the schema model
struct Compiler<'a> {
    xsd_prefix: Option<&'a str>,
    elements: Vec<&'a Node>,
    simple_types: HashMap<&'a str, &'a Node>,
    complex_types: HashMap<&'a str, &'a Node>,
    /// Named types currently being expanded
    resolving: Vec<String>,
}

impl<'a> Compiler<'a> {
    fn new(root: &'a Node) -> Result<Self> {
        if root.local_name() != "schema" {
            return Err(Error::InvalidFormat(format!(
                "expected <xs:schema> root element, found <{}>",
                root.name
            )));
        }

        let xsd_prefix = root.name.split_once(':').map(|(prefix, _)| prefix);
        let ns_attribute = xsd_prefix.map_or_else(|| "xmlns".to_string(), |p| format!("xmlns:{p}"));
        if root.attributes.get(&ns_attribute).map(String::as_str) != Some(XSD_NAMESPACE) {
            return Err(Error::InvalidFormat(format!(
                "<{}> is not bound to the XML Schema namespace",
                root.name
            )));
        }

        if root.attributes.contains_key("targetNamespace") {
            return Err(Error::Unsupported("targetNamespace".to_string()));
        }

        let mut compiler = Self {
            xsd_prefix,
            elements: Vec::new(),
            simple_types: HashMap::new(),
            complex_types: HashMap::new(),
            resolving: Vec::new(),
        };

        for child in compiler.content(root) {
            match compiler.xsd_local(child) {
                Some("element") => compiler.elements.push(child),
                Some("simpleType") => {
                    let name = required_attr(child, "name")?;
                    if compiler.simple_types.insert(name, child).is_some() {
                        return Err(Error::InvalidFormat(format!(
                            "duplicate simple type '{name}'"
                        )));
                    }
                }
                Some("complexType") => {
                    let name = required_attr(child, "name")?;
                    if compiler.complex_types.insert(name, child).is_some() {
                        return Err(Error::InvalidFormat(format!(
                            "duplicate complex type '{name}'"
                        )));
                    }
                }
                Some(other) => {
                    return Err(Error::Unsupported(format!("top-level xs:{other}")));
                }
                None => {
                    return Err(Error::InvalidFormat(format!(
                        "unexpected <{}> in schema",
                        child.name
                    )));
                }
            }
        }

        trace!(
            "Schema declares {} element(s), {} simple type(s), {} complex type(s)",
            compiler.elements.len(),
            compiler.simple_types.len(),
            compiler.complex_types.len()
        );

        Ok(compiler)
    }

    fn global_elements(&mut self) -> Result<Vec<ElementDecl>> {
        if self.elements.is_empty() {
            return Err(Error::InvalidFormat(
                "schema declares no global elements".to_string(),
            ));
        }

        let nodes = self.elements.clone();
        let mut declarations: Vec<ElementDecl> = Vec::with_capacity(nodes.len());
        for node in nodes {
            let declaration = self.element(node, true)?;
            if declarations.iter().any(|d| d.name == declaration.name) {
                return Err(Error::InvalidFormat(format!(
                    "duplicate global element '{}'",
                    declaration.name
                )));
            }
            declarations.push(declaration);
        }
        Ok(declarations)
    }

    fn element(&mut self, node: &'a Node, top_level: bool) -> Result<ElementDecl> {
        if node.attributes.contains_key("ref") {
            return Err(Error::Unsupported("element references".to_string()));
        }
        let name = required_attr(node, "name")?;

        let (min_occurs, max_occurs) = if top_level {
            if node.attributes.contains_key("minOccurs") || node.attributes.contains_key("maxOccurs")
            {
                return Err(Error::InvalidFormat(format!(
                    "global element '{name}' cannot declare occurrence bounds"
                )));
            }
            (1, Some(1))
        } else {
            occurs(node)?
        };

        let inline = self.content(node);
        let content = match (node.attributes.get("type"), inline.as_slice()) {
            (Some(reference), []) => self.type_ref(reference)?,
            (Some(_), _) => {
                return Err(Error::InvalidFormat(format!(
                    "element '{name}' has both a type attribute and an inline type"
                )));
            }
            (None, [definition]) => match self.xsd_local(definition) {
                Some("complexType") => self.complex_type(definition)?,
                Some("simpleType") => ContentModel::Simple(self.simple_type(definition, None)?),
                _ => {
                    return Err(Error::Unsupported(format!(
                        "<{}> inside element '{name}'",
                        definition.name
                    )));
                }
            },
            (None, []) => {
                return Err(Error::Unsupported(format!(
                    "element '{name}' without a type"
                )));
            }
            (None, _) => {
                return Err(Error::Unsupported(format!(
                    "multiple definitions inside element '{name}'"
                )));
            }
        };

        trace!("Compiled element '{}' ({}..{:?})", name, min_occurs, max_occurs);

        Ok(ElementDecl {
            name: name.to_string(),
            min_occurs,
            max_occurs,
            content,
        })
    }

    fn complex_type(&mut self, node: &'a Node) -> Result<ContentModel> {
        if node.attributes.get("mixed").is_some_and(|v| v == "true") {
            return Err(Error::Unsupported("mixed content".to_string()));
        }

        let mut sequence = None;
        for child in self.content(node) {
            match self.xsd_local(child) {
                Some("sequence") if sequence.is_none() => sequence = Some(self.sequence(child)?),
                Some(other) => {
                    return Err(Error::Unsupported(format!("xs:{other} in complex type")));
                }
                None => {
                    return Err(Error::InvalidFormat(format!(
                        "unexpected <{}> in complex type",
                        child.name
                    )));
                }
            }
        }

        Ok(ContentModel::Sequence(sequence.unwrap_or_default()))
    }

    fn sequence(&mut self, node: &'a Node) -> Result<Vec<ElementDecl>> {
        if occurs(node)? != (1, Some(1)) {
            return Err(Error::Unsupported(
                "optional or repeating sequences".to_string(),
            ));
        }

        let mut children = Vec::new();
        for child in self.content(node) {
            match self.xsd_local(child) {
                Some("element") => children.push(self.element(child, false)?),
                Some(other) => {
                    return Err(Error::Unsupported(format!("xs:{other} in sequence")));
                }
                None => {
                    return Err(Error::InvalidFormat(format!(
                        "unexpected <{}> in sequence",
                        child.name
                    )));
                }
            }
        }
        Ok(children)
    }

    fn simple_type(&mut self, node: &'a Node, name: Option<&str>) -> Result<SimpleType> {
        let mut restriction = None;
        for child in self.content(node) {
            match self.xsd_local(child) {
                Some("restriction") if restriction.is_none() => restriction = Some(child),
                Some(other) => {
                    return Err(Error::Unsupported(format!("xs:{other} in simple type")));
                }
                None => {
                    return Err(Error::InvalidFormat(format!(
                        "unexpected <{}> in simple type",
                        child.name
                    )));
                }
            }
        }
        let restriction = restriction.ok_or_else(|| {
            Error::InvalidFormat("simple type without xs:restriction".to_string())
        })?;

        let mut simple = self.simple_type_ref(required_attr(restriction, "base")?)?;
        simple.name = name.map(str::to_string);

        let mut alternatives: Vec<&str> = Vec::new();
        let mut enumeration = Vec::new();
        for facet in self.content(restriction) {
            let Some(kind) = self.xsd_local(facet) else {
                return Err(Error::InvalidFormat(format!(
                    "unexpected <{}> in restriction",
                    facet.name
                )));
            };
            let value = required_attr(facet, "value")?;
            match kind {
                "pattern" => alternatives.push(value),
                "enumeration" => enumeration.push(value.to_string()),
                "length" => simple.facets.length = Some(parse_count(value, kind)?),
                "minLength" => simple.facets.min_length = Some(parse_count(value, kind)?),
                "maxLength" => simple.facets.max_length = Some(parse_count(value, kind)?),
                other => return Err(Error::Unsupported(format!("facet xs:{other}"))),
            }
        }

        // Patterns within one step are alternatives; steps must all match
        match alternatives.as_slice() {
            [] => {}
            [single] => simple.facets.patterns.push(Pattern::compile(*single)?),
            many => {
                let source = many
                    .iter()
                    .map(|p| format!("(?:{p})"))
                    .collect::<Vec<_>>()
                    .join("|");
                simple.facets.patterns.push(Pattern::compile(source)?);
            }
        }
        if !enumeration.is_empty() {
            simple.facets.enumeration = enumeration;
        }

        Ok(simple)
    }

    fn type_ref(&mut self, reference: &str) -> Result<ContentModel> {
        match self.resolve(reference)? {
            Resolved::Builtin(data_type) => Ok(ContentModel::Simple(SimpleType::builtin(data_type))),
            Resolved::Simple(node, name) => {
                self.enter(name)?;
                let simple = self.simple_type(node, Some(name));
                self.leave();
                Ok(ContentModel::Simple(simple?))
            }
            Resolved::Complex(node, name) => {
                self.enter(name)?;
                let content = self.complex_type(node);
                self.leave();
                content
            }
        }
    }

    fn simple_type_ref(&mut self, reference: &str) -> Result<SimpleType> {
        match self.resolve(reference)? {
            Resolved::Builtin(data_type) => Ok(SimpleType::builtin(data_type)),
            Resolved::Simple(node, name) => {
                self.enter(name)?;
                let simple = self.simple_type(node, Some(name));
                self.leave();
                simple
            }
            Resolved::Complex(_, name) => Err(Error::InvalidFormat(format!(
                "complex type '{name}' cannot be a restriction base"
            ))),
        }
    }

    fn resolve(&self, reference: &str) -> Result<Resolved<'a>> {
        let (prefix, local) = match reference.split_once(':') {
            Some((prefix, local)) => (Some(prefix), local),
            None => (None, reference),
        };

        if prefix == self.xsd_prefix {
            if let Some(data_type) = DataType::from_xsd_name(local) {
                return Ok(Resolved::Builtin(data_type));
            }
            if prefix.is_some() {
                return Err(Error::Unsupported(format!("built-in type '{reference}'")));
            }
        } else if prefix.is_some() {
            return Err(Error::UnresolvedType(reference.to_string()));
        }

        if let Some((&name, &node)) = self.simple_types.get_key_value(local) {
            return Ok(Resolved::Simple(node, name));
        }
        if let Some((&name, &node)) = self.complex_types.get_key_value(local) {
            return Ok(Resolved::Complex(node, name));
        }
        Err(Error::UnresolvedType(reference.to_string()))
    }

    fn enter(&mut self, name: &str) -> Result<()> {
        if self.resolving.iter().any(|n| n == name) {
            return Err(Error::InvalidFormat(format!(
                "recursive type definition '{name}'"
            )));
        }
        self.resolving.push(name.to_string());
        Ok(())
    }

    fn leave(&mut self) {
        self.resolving.pop();
    }

    /// Local name of an element in the XML Schema namespace
    fn xsd_local<'n>(&self, node: &'n Node) -> Option<&'n str> {
        let (prefix, local) = match node.name.split_once(':') {
            Some((prefix, local)) => (Some(prefix), local),
            None => (None, node.name.as_str()),
        };
        (prefix == self.xsd_prefix).then_some(local)
    }

    /// Children that carry meaning, skipping annotations
    fn content<'n>(&self, node: &'n Node) -> Vec<&'n Node> {
        node.children
            .iter()
            .filter(|child| self.xsd_local(child) != Some("annotation"))
            .collect()
    }
}

fn required_attr<'n>(node: &'n Node, name: &str) -> Result<&'n str> {
    node.attributes.get(name).map(String::as_str).ok_or_else(|| {
        Error::InvalidFormat(format!("<{}> is missing the '{name}' attribute", node.name))
    })
}

fn parse_count(value: &str, what: &str) -> Result<usize> {
    value
        .trim()
        .parse::<usize>()
        .map_err(|_| Error::InvalidFormat(format!("invalid {what} value '{value}'")))
}

fn occurs(node: &Node) -> Result<(usize, Option<usize>)> {
    let min = match node.attributes.get("minOccurs") {
        Some(value) => parse_count(value, "minOccurs")?,
        None => 1,
    };
    let max = match node.attributes.get("maxOccurs").map(String::as_str) {
        Some("unbounded") => None,
        Some(value) => Some(parse_count(value, "maxOccurs")?),
        None => Some(1),
    };

    if max.is_some_and(|max| min > max) {
        return Err(Error::InvalidFormat(format!(
            "<{}> has minOccurs {min} greater than maxOccurs",
            node.name
        )));
    }
    Ok((min, max))
}
