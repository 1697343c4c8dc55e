//! Validation engine

use crate::rules::{
    RuleResult, normalize_whitespace, validate_data_type, validate_enumeration, validate_length,
    validate_pattern,
};
use mediator_ir::{Document, Node, Position};
use mediator_schema::{ContentModel, ElementDecl, Schema, SchemaShape, SimpleType};
use std::fmt;
use tracing::{debug, trace, warn};

const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";

/// Validation configuration
#[derive(Debug, Clone)]
pub struct ValidationConfig {
    /// Maximum errors collected before further issues are dropped (0 = unlimited)
    pub max_errors: usize,
    /// Allow `xmlns*` and `xsi:*` attributes on any element
    pub allow_schema_attributes: bool,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            max_errors: 0,
            allow_schema_attributes: true,
        }
    }
}

/// Kind of validation issue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    RootMismatch,
    MissingElement,
    TooManyElements,
    UnexpectedElement,
    UnexpectedText,
    UnexpectedChild,
    UnexpectedAttribute,
    InvalidDatatype,
    PatternMismatch,
    LengthViolation,
    EnumerationMismatch,
}

impl ErrorCode {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::RootMismatch => "ROOT_MISMATCH",
            Self::MissingElement => "MISSING_ELEMENT",
            Self::TooManyElements => "TOO_MANY_ELEMENTS",
            Self::UnexpectedElement => "UNEXPECTED_ELEMENT",
            Self::UnexpectedText => "UNEXPECTED_TEXT",
            Self::UnexpectedChild => "UNEXPECTED_CHILD",
            Self::UnexpectedAttribute => "UNEXPECTED_ATTRIBUTE",
            Self::InvalidDatatype => "INVALID_DATATYPE",
            Self::PatternMismatch => "PATTERN_MISMATCH",
            Self::LengthViolation => "LENGTH_VIOLATION",
            Self::EnumerationMismatch => "ENUMERATION_MISMATCH",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validation error details
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub code: ErrorCode,
    /// Error message
    pub message: String,
    /// Slash-separated element path, e.g. `newschema/newdata/newvalue`
    pub path: String,
    /// Position of the offending element, for documents read from bytes
    pub position: Option<Position>,
}

impl ValidationError {
    fn new(code: ErrorCode, path: &str, node: Option<&Node>, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            path: path.to_string(),
            position: node.and_then(|n| n.position),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.code, self.path, self.message)?;
        if let Some(position) = self.position {
            write!(f, " (line {}, column {})", position.line, position.column)?;
        }
        Ok(())
    }
}

/// Validation result
#[derive(Debug, Clone)]
pub struct ValidationResult {
    /// Schema the document was checked against
    pub shape: SchemaShape,
    /// Whether validation passed
    pub is_valid: bool,
    /// List of errors found
    pub errors: Vec<ValidationError>,
}

impl ValidationResult {
    /// Create a new valid result
    #[must_use]
    pub fn valid(shape: SchemaShape) -> Self {
        Self {
            shape,
            is_valid: true,
            errors: Vec::new(),
        }
    }

    /// Check if there are any errors
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Add an error
    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
        self.is_valid = false;
    }

    /// Whether any collected error carries `code`
    #[must_use]
    pub fn has_code(&self, code: ErrorCode) -> bool {
        self.errors.iter().any(|e| e.code == code)
    }

    /// Turn a failed result into an error listing every issue
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Invalid`] when the document is not valid.
    pub fn into_result(self) -> crate::Result<()> {
        if self.is_valid {
            Ok(())
        } else {
            Err(crate::Error::Invalid {
                shape: self.shape,
                errors: self.errors,
            })
        }
    }
}

/// Checks element trees against loaded schemas
#[derive(Debug)]
pub struct ValidationEngine {
    config: ValidationConfig,
}

impl ValidationEngine {
    /// Create a new validation engine
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: ValidationConfig::default(),
        }
    }

    /// Create with specific configuration
    #[must_use]
    pub fn with_config(config: ValidationConfig) -> Self {
        Self { config }
    }

    /// Validate a complete document, collecting every issue
    #[must_use]
    pub fn validate(&self, doc: &Document, schema: &Schema) -> ValidationResult {
        debug!(
            "Validating <{}> against the {} schema ({})",
            doc.root.name, schema.shape, schema.origin
        );
        let mut result = ValidationResult::valid(schema.shape);
        let root = &doc.root;
        let scope = Scope::enter(None, root);

        let decl = match scope.namespace_of(&root.name) {
            Ok("") => schema.element(&root.name),
            Ok(namespace) => {
                self.report(
                    &mut result,
                    ValidationError::new(
                        ErrorCode::RootMismatch,
                        &root.name,
                        Some(root),
                        format!(
                            "Element <{}> is in namespace '{namespace}' but the {} schema declares no target namespace",
                            root.name, schema.shape
                        ),
                    ),
                );
                return finish(schema, result);
            }
            Err(message) => {
                self.report(
                    &mut result,
                    ValidationError::new(ErrorCode::RootMismatch, &root.name, Some(root), message),
                );
                return finish(schema, result);
            }
        };

        match decl {
            Some(decl) => self.validate_element(root, decl, &root.name, &scope, &mut result),
            None => self.report(
                &mut result,
                ValidationError::new(
                    ErrorCode::RootMismatch,
                    &root.name,
                    Some(root),
                    format!(
                        "Expected root element {}, found <{}>",
                        schema
                            .root_names()
                            .iter()
                            .map(|n| format!("<{n}>"))
                            .collect::<Vec<_>>()
                            .join(" or "),
                        root.name
                    ),
                ),
            ),
        }

        finish(schema, result)
    }

    fn report(&self, result: &mut ValidationResult, error: ValidationError) {
        trace!("Validation issue: {}", error);
        if self.config.max_errors == 0 || result.errors.len() < self.config.max_errors {
            result.add_error(error);
        } else {
            result.is_valid = false;
        }
    }

    fn validate_element(
        &self,
        node: &Node,
        decl: &ElementDecl,
        path: &str,
        scope: &Scope<'_>,
        result: &mut ValidationResult,
    ) {
        self.validate_attributes(node, path, result);

        match &decl.content {
            ContentModel::Simple(simple) => {
                if let Some(child) = node.children.first() {
                    self.report(
                        result,
                        ValidationError::new(
                            ErrorCode::UnexpectedChild,
                            path,
                            Some(child),
                            format!(
                                "Element <{}> has simple content but contains <{}>",
                                node.name, child.name
                            ),
                        ),
                    );
                    return;
                }
                self.validate_value(node, simple, path, result);
            }
            ContentModel::Sequence(children) => {
                if node.has_significant_text() {
                    self.report(
                        result,
                        ValidationError::new(
                            ErrorCode::UnexpectedText,
                            path,
                            Some(node),
                            format!("Element <{}> cannot contain character data", node.name),
                        ),
                    );
                }
                self.validate_sequence(node, children, path, scope, result);
            }
        }
    }

    fn validate_attributes(&self, node: &Node, path: &str, result: &mut ValidationResult) {
        for name in node.attributes.keys() {
            let schema_attribute = name == "xmlns" || name.starts_with("xmlns:") || name.starts_with("xsi:");
            if self.config.allow_schema_attributes && schema_attribute {
                continue;
            }
            self.report(
                result,
                ValidationError::new(
                    ErrorCode::UnexpectedAttribute,
                    path,
                    Some(node),
                    format!("Attribute '{name}' is not allowed on <{}>", node.name),
                ),
            );
        }
    }

    /// Match children greedily against the declared sequence
    fn validate_sequence(
        &self,
        node: &Node,
        decls: &[ElementDecl],
        path: &str,
        scope: &Scope<'_>,
        result: &mut ValidationResult,
    ) {
        let children: Vec<(&Node, Scope<'_>)> = node
            .children
            .iter()
            .map(|child| (child, Scope::enter(Some(scope), child)))
            .collect();
        let mut index = 0;
        let mut counts = vec![0usize; decls.len()];

        for (decl, count) in decls.iter().zip(counts.iter_mut()) {
            while let Some((child, child_scope)) = children.get(index) {
                let child = *child;
                if !child_scope.is_unqualified(&child.name)
                    || child.name != decl.name
                    || decl.max_occurs.is_some_and(|max| *count >= max)
                {
                    break;
                }
                let child_path = format!("{path}/{}", child.name);
                self.validate_element(child, decl, &child_path, child_scope, result);
                *count += 1;
                index += 1;
            }

            if *count < decl.min_occurs {
                let message = if decl.min_occurs == 1 {
                    format!("Required element <{}> is missing", decl.name)
                } else {
                    format!(
                        "Element <{}> must appear at least {} times, found {}",
                        decl.name, decl.min_occurs, count
                    )
                };
                self.report(
                    result,
                    ValidationError::new(
                        ErrorCode::MissingElement,
                        &format!("{path}/{}", decl.name),
                        Some(node),
                        message,
                    ),
                );
            }
        }

        for (child, child_scope) in children.iter().skip(index) {
            let child = *child;
            let child_path = format!("{path}/{}", child.name);
            let namespace = match child_scope.namespace_of(&child.name) {
                Ok("") => None,
                Ok(namespace) => Some(format!(
                    "Element <{}> is in namespace '{namespace}', expected no namespace",
                    child.name
                )),
                Err(message) => Some(message),
            };
            if let Some(message) = namespace {
                self.report(
                    result,
                    ValidationError::new(ErrorCode::UnexpectedElement, &child_path, Some(child), message),
                );
                continue;
            }

            let exhausted = decls
                .iter()
                .zip(&counts)
                .any(|(decl, count)| decl.name == child.name && decl.max_occurs == Some(*count));
            let error = if exhausted {
                ValidationError::new(
                    ErrorCode::TooManyElements,
                    &child_path,
                    Some(child),
                    format!("Element <{}> appears more often than allowed", child.name),
                )
            } else {
                ValidationError::new(
                    ErrorCode::UnexpectedElement,
                    &child_path,
                    Some(child),
                    format!("Element <{}> is not expected here", child.name),
                )
            };
            self.report(result, error);
        }
    }

    fn validate_value(
        &self,
        node: &Node,
        simple: &SimpleType,
        path: &str,
        result: &mut ValidationResult,
    ) {
        let value = normalize_whitespace(node.text_or_empty(), simple.base);
        let mut check = |code: ErrorCode, rule: RuleResult| {
            if !rule.is_valid {
                let message = rule.message.unwrap_or_default();
                self.report(result, ValidationError::new(code, path, Some(node), message));
            }
        };

        let data_type = validate_data_type(&value, simple.base);
        let well_typed = data_type.is_valid;
        check(ErrorCode::InvalidDatatype, data_type);
        if !well_typed {
            return;
        }

        check(ErrorCode::LengthViolation, validate_length(&value, &simple.facets));
        for pattern in &simple.facets.patterns {
            check(ErrorCode::PatternMismatch, validate_pattern(&value, pattern));
        }
        check(
            ErrorCode::EnumerationMismatch,
            validate_enumeration(&value, &simple.facets.enumeration),
        );
    }
}

fn finish(schema: &Schema, result: ValidationResult) -> ValidationResult {
    if !result.is_valid {
        warn!(
            "Document failed {} schema validation with {} error(s)",
            schema.shape,
            result.errors.len()
        );
    }
    result
}

/// Namespace bindings in scope at one element; the empty prefix is the
/// default namespace
struct Scope<'a> {
    parent: Option<&'a Scope<'a>>,
    bindings: Vec<(&'a str, &'a str)>,
}

impl<'a> Scope<'a> {
    fn enter(parent: Option<&'a Scope<'a>>, node: &'a Node) -> Self {
        let bindings = node
            .attributes
            .iter()
            .filter_map(|(key, uri)| {
                if key == "xmlns" {
                    Some(("", uri.as_str()))
                } else {
                    key.strip_prefix("xmlns:").map(|prefix| (prefix, uri.as_str()))
                }
            })
            .collect();
        Self { parent, bindings }
    }

    fn lookup(&self, prefix: &str) -> Option<&'a str> {
        self.bindings
            .iter()
            .find(|(bound, _)| *bound == prefix)
            .map(|(_, uri)| *uri)
            .or_else(|| self.parent.and_then(|parent| parent.lookup(prefix)))
    }

    /// Namespace URI of an element name, `""` for no namespace
    fn namespace_of(&self, qname: &str) -> Result<&'a str, String> {
        match qname.split_once(':') {
            Some(("xml", _)) => Ok(XML_NAMESPACE),
            Some((prefix, _)) => self
                .lookup(prefix)
                .filter(|uri| !uri.is_empty())
                .ok_or_else(|| format!("Namespace prefix '{prefix}' of <{qname}> is not declared")),
            None => Ok(self.lookup("").unwrap_or("")),
        }
    }

    fn is_unqualified(&self, qname: &str) -> bool {
        matches!(self.namespace_of(qname), Ok(""))
    }
}

impl Default for ValidationEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mediator_ir::XmlReader;
    use mediator_schema::{SchemaLoader, SchemaShape};

    fn new_schema() -> Schema {
        SchemaLoader::new().load_bundled(SchemaShape::New).unwrap()
    }

    fn check(xml: &str, schema: &Schema) -> ValidationResult {
        let doc = XmlReader::new().read(xml.as_bytes()).unwrap();
        ValidationEngine::new().validate(&doc, schema)
    }

    fn codes(result: &ValidationResult) -> Vec<ErrorCode> {
        result.errors.iter().map(|e| e.code).collect()
    }

    #[test]
    fn test_valid_document() {
        let result = check(
            "<newschema><newid>1</newid><newname>n</newname>\
             <newdata><newtime>2024-01-01T00:00:00Z</newtime><newvalue>abcdef</newvalue></newdata>\
             </newschema>",
            &new_schema(),
        );
        assert!(result.is_valid, "{:?}", result.errors);
    }

    #[test]
    fn test_root_mismatch() {
        let result = check("<oldschema/>", &new_schema());
        assert_eq!(codes(&result), vec![ErrorCode::RootMismatch]);
        assert!(result.errors[0].message.contains("<newschema>"));
    }

    #[test]
    fn test_root_in_foreign_namespace() {
        let result = check(r#"<newschema xmlns="urn:other"><newid>1</newid></newschema>"#, &new_schema());
        assert_eq!(codes(&result), vec![ErrorCode::RootMismatch]);
        assert!(result.errors[0].message.contains("urn:other"));
    }

    #[test]
    fn test_root_with_undeclared_prefix() {
        let result = check("<p:newschema><newid>1</newid></p:newschema>", &new_schema());
        assert_eq!(codes(&result), vec![ErrorCode::RootMismatch]);
        assert!(result.errors[0].message.contains("not declared"));
    }

    #[test]
    fn test_empty_default_namespace_is_no_namespace() {
        let result = check(r#"<newschema xmlns=""><newid>1</newid></newschema>"#, &new_schema());
        assert!(result.is_valid, "{:?}", result.errors);
    }

    #[test]
    fn test_child_in_foreign_namespace() {
        let result = check(
            r#"<newschema xmlns:p="urn:other"><p:newid>1</p:newid></newschema>"#,
            &new_schema(),
        );
        assert_eq!(
            codes(&result),
            vec![ErrorCode::MissingElement, ErrorCode::UnexpectedElement]
        );
        assert_eq!(result.errors[1].path, "newschema/p:newid");
        assert!(result.errors[1].message.contains("urn:other"));
    }

    #[test]
    fn test_default_namespace_is_inherited() {
        let result = check(
            r#"<newschema><newid>1</newid><newdata xmlns="urn:other"><newvalue>abcdef</newvalue></newdata></newschema>"#,
            &new_schema(),
        );
        assert_eq!(codes(&result), vec![ErrorCode::UnexpectedElement]);
        assert_eq!(result.errors[0].path, "newschema/newdata");
    }

    #[test]
    fn test_missing_required_element() {
        let result = check("<newschema><newname>TEST</newname></newschema>", &new_schema());
        assert_eq!(codes(&result), vec![ErrorCode::MissingElement]);
        assert_eq!(result.errors[0].path, "newschema/newid");
    }

    #[test]
    fn test_pattern_mismatch_path() {
        let result = check(
            "<newschema><newid>1</newid><newdata><newvalue>INVALID_VALUE</newvalue></newdata></newschema>",
            &new_schema(),
        );
        assert_eq!(codes(&result), vec![ErrorCode::PatternMismatch]);
        assert_eq!(result.errors[0].path, "newschema/newdata/newvalue");
        assert!(result.errors[0].position.is_some());
    }

    #[test]
    fn test_collects_every_issue() {
        let result = check(
            "<newschema><newdata><newtime>never</newtime><newvalue>xyz</newvalue></newdata></newschema>",
            &new_schema(),
        );
        assert_eq!(
            codes(&result),
            vec![
                ErrorCode::MissingElement,
                ErrorCode::InvalidDatatype,
                ErrorCode::PatternMismatch
            ]
        );
    }

    #[test]
    fn test_max_errors_limits_collection() {
        let doc = XmlReader::new()
            .read(b"<newschema><newdata><newtime>never</newtime><newvalue>xyz</newvalue></newdata></newschema>")
            .unwrap();
        let engine = ValidationEngine::with_config(ValidationConfig {
            max_errors: 1,
            ..ValidationConfig::default()
        });
        let result = engine.validate(&doc, &new_schema());
        assert!(!result.is_valid);
        assert_eq!(result.errors.len(), 1);
    }

    #[test]
    fn test_out_of_order_children() {
        let result = check(
            "<newschema><newname>n</newname><newid>1</newid></newschema>",
            &new_schema(),
        );
        assert_eq!(
            codes(&result),
            vec![ErrorCode::MissingElement, ErrorCode::UnexpectedElement]
        );
        assert_eq!(result.errors[1].path, "newschema/newid");
    }

    #[test]
    fn test_too_many_elements() {
        let result = check(
            "<newschema><newid>1</newid><newid>2</newid></newschema>",
            &new_schema(),
        );
        assert_eq!(codes(&result), vec![ErrorCode::TooManyElements]);
    }

    #[test]
    fn test_text_and_children_in_wrong_places() {
        let result = check(
            "<newschema>stray<newid><b/></newid></newschema>",
            &new_schema(),
        );
        assert_eq!(
            codes(&result),
            vec![ErrorCode::UnexpectedText, ErrorCode::UnexpectedChild]
        );
    }

    #[test]
    fn test_attributes() {
        let schema = new_schema();
        let result = check(
            r#"<newschema xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" xsi:noNamespaceSchemaLocation="NewSchema.xsd"><newid kind="x">1</newid></newschema>"#,
            &schema,
        );
        assert_eq!(codes(&result), vec![ErrorCode::UnexpectedAttribute]);
        assert_eq!(result.errors[0].path, "newschema/newid");
    }

    #[test]
    fn test_datetime_whitespace_is_collapsed() {
        let result = check(
            "<newschema><newid>1</newid><newdata><newtime>\n  2024-01-01T00:00:00Z\n</newtime><newvalue>abcdef</newvalue></newdata></newschema>",
            &new_schema(),
        );
        assert!(result.is_valid, "{:?}", result.errors);
    }

    #[test]
    fn test_into_result() {
        let result = check("<newschema/>", &new_schema());
        let err = result.into_result().unwrap_err();
        let message = err.to_string();
        assert!(message.contains("new schema"));
        assert!(message.contains("MISSING_ELEMENT"));

        assert!(ValidationResult::valid(SchemaShape::New).into_result().is_ok());
    }

    #[test]
    fn test_error_display() {
        let error = ValidationError {
            code: ErrorCode::PatternMismatch,
            message: "bad".to_string(),
            path: "a/b".to_string(),
            position: Some(Position::new(3, 7, 40)),
        };
        assert_eq!(
            error.to_string(),
            "[PATTERN_MISMATCH] a/b: bad (line 3, column 7)"
        );
    }
}
