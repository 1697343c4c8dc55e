//! Document decoding

use crate::{DecodeError, XmlRecord};
use mediator_ir::XmlReader;
use mediator_schema::Schema;
use mediator_validation::ValidationEngine;
use tracing::{debug, trace};

/// Decode a document into a record, validating it against `schema` first.
///
/// The whole input is read into memory; nothing is bound unless the
/// document is both well-formed and valid.
///
/// # Errors
///
/// - [`DecodeError::Malformed`] when the bytes are not well-formed XML
/// - [`DecodeError::Invalid`] when the document violates `schema`
/// - [`DecodeError::Binding`] when the validated tree cannot become an `R`
pub fn decode<R: XmlRecord>(bytes: &[u8], schema: &Schema) -> Result<R, DecodeError> {
    trace!("Decoding {} bytes against the {} schema", bytes.len(), schema.shape);

    let document = XmlReader::new().read(bytes).map_err(DecodeError::Malformed)?;
    ValidationEngine::new()
        .validate(&document, schema)
        .into_result()
        .map_err(DecodeError::Invalid)?;

    let record = R::from_node(&document.root).map_err(DecodeError::Binding)?;
    debug!("Decoded <{}> record", R::ROOT);
    Ok(record)
}
