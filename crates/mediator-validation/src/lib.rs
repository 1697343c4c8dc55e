#![deny(rust_2018_idioms)]
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

//! # mediator-validation
//!
//! Validation of element trees against loaded schemas.
//!
//! The engine walks a document alongside the schema's element declarations
//! and reports every structural problem (missing, misplaced or surplus
//! elements, stray text and attributes) together with datatype and facet
//! violations of simple-typed values.
//!
//! ## Example Usage
//!
//! ```rust
//! use mediator_ir::XmlReader;
//! use mediator_schema::{SchemaLoader, SchemaShape};
//! use mediator_validation::ValidationEngine;
//!
//! let schema = SchemaLoader::new().load_bundled(SchemaShape::New).unwrap();
//! let doc = XmlReader::new()
//!     .read(b"<newschema><newid>1234</newid></newschema>")
//!     .unwrap();
//!
//! let result = ValidationEngine::new().validate(&doc, &schema);
//! assert!(result.is_valid);
//! ```

pub mod engine;
pub mod rules;

// Re-export main types
pub use engine::{ErrorCode, ValidationConfig, ValidationEngine, ValidationError, ValidationResult};
pub use rules::{
    RuleResult, normalize_whitespace, validate_data_type, validate_enumeration, validate_length,
    validate_pattern,
};

use mediator_schema::SchemaShape;
use thiserror::Error;

/// Errors that can occur during validation
#[derive(Error, Debug)]
pub enum Error {
    #[error("Document does not conform to the {shape} schema: {}", summarize(.errors))]
    Invalid {
        shape: SchemaShape,
        errors: Vec<ValidationError>,
    },
}

impl Error {
    /// Individual issues behind the failure
    #[must_use]
    pub fn errors(&self) -> &[ValidationError] {
        match self {
            Self::Invalid { errors, .. } => errors,
        }
    }
}

fn summarize(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

pub type Result<T> = std::result::Result<T, Error>;

/// Convenience function to validate a document with default settings
///
/// # Errors
///
/// Returns [`Error::Invalid`] listing every issue when the document does not
/// conform to `schema`.
pub fn validate(doc: &mediator_ir::Document, schema: &mediator_schema::Schema) -> Result<()> {
    ValidationEngine::new().validate(doc, schema).into_result()
}
