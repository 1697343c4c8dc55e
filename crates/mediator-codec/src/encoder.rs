//! Record encoding

use crate::{EncodeError, XmlRecord};
use mediator_ir::{Declaration, Document, WriterOptions, XmlWriter};
use mediator_schema::Schema;
use mediator_validation::ValidationEngine;
use tracing::{debug, trace};

/// Indent width used for pretty output
pub const PRETTY_INDENT: usize = 4;

/// Options controlling how encoded output looks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodeOptions {
    /// Write `<?xml version="1.0" encoding="UTF-8" standalone="yes"?>` first
    pub xml_declaration: bool,
    /// Spaces per nesting level, `None` for single-line output
    pub indent: Option<usize>,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            xml_declaration: true,
            indent: None,
        }
    }
}

impl EncodeOptions {
    /// Default options with indented output
    #[must_use]
    pub fn pretty() -> Self {
        Self {
            indent: Some(PRETTY_INDENT),
            ..Self::default()
        }
    }

    /// Set the XML declaration flag
    #[must_use]
    pub fn with_declaration(mut self, enabled: bool) -> Self {
        self.xml_declaration = enabled;
        self
    }

    fn writer_options(&self) -> WriterOptions {
        WriterOptions {
            declaration: self.xml_declaration.then(Declaration::default),
            indent: self.indent,
        }
    }
}

/// Encode a record, validating its element tree against `schema` first.
///
/// # Errors
///
/// - [`EncodeError::Invalid`] when the record violates `schema`
/// - [`EncodeError::Write`] when rendering fails
pub fn encode<R: XmlRecord>(
    record: &R,
    schema: &Schema,
    options: &EncodeOptions,
) -> Result<Vec<u8>, EncodeError> {
    let document = Document::new(record.to_node());
    trace!("Encoding <{}> against the {} schema", R::ROOT, schema.shape);

    ValidationEngine::new()
        .validate(&document, schema)
        .into_result()
        .map_err(EncodeError::Invalid)?;

    let bytes = XmlWriter::new(options.writer_options())
        .write(&document.root)
        .map_err(EncodeError::Write)?;
    debug!("Encoded <{}> record into {} bytes", R::ROOT, bytes.len());
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mediator_ir::{NewDetail, NewRecord};
    use mediator_schema::{SchemaLoader, SchemaShape};
    use mediator_validation::ErrorCode;

    fn new_schema() -> Schema {
        SchemaLoader::new().load_bundled(SchemaShape::New).unwrap()
    }

    fn record(id: Option<&str>, value: &str) -> NewRecord {
        NewRecord {
            id: id.map(str::to_string),
            name: Some("TEST".to_string()),
            data: Some(NewDetail {
                time: None,
                value: Some(value.to_string()),
            }),
        }
    }

    #[test]
    fn test_encode_compact() {
        let bytes = encode(
            &record(Some("1234"), "abcdef"),
            &new_schema(),
            &EncodeOptions::default(),
        )
        .unwrap();
        assert_eq!(
            String::from_utf8(bytes).unwrap(),
            "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\
             <newschema><newid>1234</newid><newname>TEST</newname>\
             <newdata><newvalue>abcdef</newvalue></newdata></newschema>"
        );
    }

    #[test]
    fn test_encode_pretty_without_declaration() {
        let options = EncodeOptions::pretty().with_declaration(false);
        let bytes = encode(&record(Some("1"), "abcdef"), &new_schema(), &options).unwrap();
        assert_eq!(
            String::from_utf8(bytes).unwrap(),
            "<newschema>\n    <newid>1</newid>\n    <newname>TEST</newname>\n    <newdata>\n        <newvalue>abcdef</newvalue>\n    </newdata>\n</newschema>"
        );
    }

    #[test]
    fn test_encode_missing_id() {
        let err = encode(&record(None, "abcdef"), &new_schema(), &EncodeOptions::default())
            .unwrap_err();
        assert!(matches!(err, EncodeError::Invalid(_)));
        assert_eq!(err.validation_errors()[0].code, ErrorCode::MissingElement);
        assert_eq!(err.validation_errors()[0].path, "newschema/newid");
    }

    #[test]
    fn test_encode_pattern_mismatch() {
        let err = encode(
            &record(Some("1234"), "INVALID_VALUE"),
            &new_schema(),
            &EncodeOptions::default(),
        )
        .unwrap_err();
        assert_eq!(err.validation_errors()[0].code, ErrorCode::PatternMismatch);
    }

    #[test]
    fn test_encode_detail_without_value() {
        let mut record = record(Some("1234"), "abcdef");
        record.data = Some(NewDetail::default());

        let err = encode(&record, &new_schema(), &EncodeOptions::default()).unwrap_err();
        assert_eq!(err.validation_errors()[0].path, "newschema/newdata/newvalue");
    }
}
