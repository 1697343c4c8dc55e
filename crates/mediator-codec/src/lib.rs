#![deny(rust_2018_idioms)]
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

//! # mediator-codec
//!
//! Schema-validated decoding and encoding of records.
//!
//! [`decode`] reads bytes into a record only after the document passed
//! validation against the given schema, and [`encode`] renders a record only
//! after its element tree passed validation. Encoding is the gate that keeps
//! non-conforming output from ever being produced: it returns a complete
//! buffer or an error, never a partial document.

pub mod binding;
pub mod decoder;
pub mod encoder;

pub use binding::XmlRecord;
pub use decoder::decode;
pub use encoder::{EncodeOptions, encode};

use thiserror::Error;

/// Failure to bind a validated element tree to a record
#[derive(Error, Debug)]
pub enum BindingError {
    #[error("Expected <{expected}> root element, found <{found}>")]
    Root {
        expected: &'static str,
        found: String,
    },

    #[error("Cannot convert the value of <{element}>")]
    Value {
        element: String,
        #[source]
        source: mediator_ir::Error,
    },
}

/// Errors that can occur when decoding a document
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("Input is not well-formed XML")]
    Malformed(#[source] mediator_ir::Error),

    #[error("Input failed schema validation")]
    Invalid(#[source] mediator_validation::Error),

    #[error("Input could not be bound to a record")]
    Binding(#[source] BindingError),
}

/// Errors that can occur when encoding a record
#[derive(Error, Debug)]
pub enum EncodeError {
    #[error("Output failed schema validation")]
    Invalid(#[source] mediator_validation::Error),

    #[error("Output could not be written")]
    Write(#[source] mediator_ir::Error),
}

impl DecodeError {
    /// Validation issues behind an [`DecodeError::Invalid`] failure
    #[must_use]
    pub fn validation_errors(&self) -> &[mediator_validation::ValidationError] {
        match self {
            Self::Invalid(source) => source.errors(),
            _ => &[],
        }
    }
}

impl EncodeError {
    /// Validation issues behind an [`EncodeError::Invalid`] failure
    #[must_use]
    pub fn validation_errors(&self) -> &[mediator_validation::ValidationError] {
        match self {
            Self::Invalid(source) => source.errors(),
            Self::Write(_) => &[],
        }
    }
}
