#![deny(rust_2018_idioms)]
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

//! # mediator-ir
//!
//! In-memory representation shared by every stage of the mediator.
//!
//! This crate provides a schema-agnostic XML element tree used for validation,
//! the typed record shapes of the old and new document schemas, and the
//! `quick-xml` based reader and writer that move trees to and from bytes.

/// Document container and top-level metadata.
pub mod document;
/// Source positions used in error reporting.
pub mod metadata;
/// Element tree model.
pub mod node;
/// Typed records for the old and new document shapes.
pub mod record;
/// `xs:dateTime` values.
pub mod timestamp;
/// XML reader and writer.
pub mod xml;

pub use document::{Declaration, Document, DocumentMetadata};
pub use metadata::Position;
pub use node::Node;
pub use record::{NewDetail, NewRecord, OldDetail, OldRecord};
pub use timestamp::Timestamp;
pub use xml::{XmlReader, XmlWriter, WriterOptions};

use thiserror::Error;

/// Errors that can occur when reading or writing XML
#[derive(Error, Debug)]
pub enum Error {
    #[error("XML is not well-formed at line {}, column {}: {message}", position.line, position.column)]
    Malformed { position: Position, message: String },

    #[error("Document is not valid UTF-8: {0}")]
    Encoding(#[from] std::str::Utf8Error),

    #[error("XML write error: {0}")]
    Write(String),

    #[error("Invalid timestamp '{value}': {reason}")]
    Timestamp { value: String, reason: String },
}

impl Error {
    /// Build a well-formedness error at the given position.
    pub fn malformed(position: Position, message: impl Into<String>) -> Self {
        Self::Malformed {
            position,
            message: message.into(),
        }
    }

    /// Build a timestamp parse error.
    pub fn timestamp(value: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Timestamp {
            value: value.into(),
            reason: reason.into(),
        }
    }
}

/// Crate-local result type for IR operations.
pub type Result<T> = std::result::Result<T, Error>;
