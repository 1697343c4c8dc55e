//! Integration tests for mediator-validation
//!
//! These tests read real documents and validate them against bundled and
//! inline schemas.

use mediator_ir::{Document, XmlReader};
use mediator_schema::{Schema, SchemaLoader, SchemaShape, SchemaSource};
use mediator_validation::{ErrorCode, ValidationEngine, validate};

const ORDER_SCHEMA: &str = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
    <xs:simpleType name="Status">
        <xs:restriction base="xs:token">
            <xs:enumeration value="open"/>
            <xs:enumeration value="closed"/>
        </xs:restriction>
    </xs:simpleType>
    <xs:element name="order">
        <xs:complexType>
            <xs:sequence>
                <xs:element name="status" type="Status"/>
                <xs:element name="line" minOccurs="1" maxOccurs="unbounded">
                    <xs:complexType>
                        <xs:sequence>
                            <xs:element name="qty" type="xs:int"/>
                            <xs:element name="sku">
                                <xs:simpleType>
                                    <xs:restriction base="xs:string">
                                        <xs:minLength value="3"/>
                                        <xs:maxLength value="5"/>
                                    </xs:restriction>
                                </xs:simpleType>
                            </xs:element>
                        </xs:sequence>
                    </xs:complexType>
                </xs:element>
                <xs:element name="shipped" type="xs:boolean" minOccurs="0"/>
            </xs:sequence>
        </xs:complexType>
    </xs:element>
</xs:schema>"#;

fn order_schema() -> Schema {
    SchemaLoader::new()
        .load(SchemaShape::New, &SchemaSource::Inline(ORDER_SCHEMA.to_string()))
        .unwrap()
}

fn read(xml: &str) -> Document {
    XmlReader::new().read(xml.as_bytes()).unwrap()
}

#[test]
fn test_old_schema_accepts_every_optional_combination() -> anyhow::Result<()> {
    let schema = SchemaLoader::new().load_bundled(SchemaShape::Old)?;

    for xml in [
        "<oldschema/>",
        "<oldschema><oldid>1234</oldid></oldschema>",
        "<oldschema><oldname>TEST</oldname><olddata/></oldschema>",
        "<oldschema><olddata><oldtime>2024-05-01T10:00:00</oldtime></olddata></oldschema>",
        "<oldschema>\n  <oldid>1</oldid>\n  <olddata>\n    <oldvalue>ABCDEF</oldvalue>\n  </olddata>\n</oldschema>",
    ] {
        validate(&read(xml), &schema)?;
    }
    Ok(())
}

#[test]
fn test_old_schema_rejects_bad_timestamp() {
    let schema = SchemaLoader::new().load_bundled(SchemaShape::Old).unwrap();
    let doc = read("<oldschema><olddata><oldtime>not a time</oldtime></olddata></oldschema>");

    let result = ValidationEngine::new().validate(&doc, &schema);
    assert!(!result.is_valid);
    assert!(result.has_code(ErrorCode::InvalidDatatype));
    assert_eq!(result.errors[0].path, "oldschema/olddata/oldtime");
}

#[test]
fn test_old_schema_rejects_unknown_element() {
    let schema = SchemaLoader::new().load_bundled(SchemaShape::Old).unwrap();
    let doc = read("<oldschema><oldid>1</oldid><oldcolour>red</oldcolour></oldschema>");

    let result = ValidationEngine::new().validate(&doc, &schema);
    assert!(result.has_code(ErrorCode::UnexpectedElement));
}

#[test]
fn test_repeating_elements() {
    let schema = order_schema();
    let doc = read(
        "<order><status> open </status>\
         <line><qty>2</qty><sku>AB-1</sku></line>\
         <line><qty>+7</qty><sku>XYZ</sku></line>\
         <shipped>false</shipped></order>",
    );

    let result = ValidationEngine::new().validate(&doc, &schema);
    assert!(result.is_valid, "{:?}", result.errors);
}

#[test]
fn test_facets_on_nested_values() {
    let schema = order_schema();
    let doc = read(
        "<order><status>pending</status>\
         <line><qty>many</qty><sku>AB</sku></line>\
         <shipped>yes</shipped></order>",
    );

    let result = ValidationEngine::new().validate(&doc, &schema);
    let codes: Vec<_> = result.errors.iter().map(|e| e.code).collect();
    assert_eq!(
        codes,
        vec![
            ErrorCode::EnumerationMismatch,
            ErrorCode::InvalidDatatype,
            ErrorCode::LengthViolation,
            ErrorCode::InvalidDatatype,
        ]
    );
    assert_eq!(result.errors[2].path, "order/line/sku");
}

#[test]
fn test_minimum_occurrences() {
    let schema = order_schema();
    let result = ValidationEngine::new().validate(&read("<order><status>open</status></order>"), &schema);

    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].code, ErrorCode::MissingElement);
    assert_eq!(result.errors[0].path, "order/line");
}
