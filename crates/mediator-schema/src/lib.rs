//! # mediator-schema
//!
//! Schema model, loader, and bundled schema resources.
//!
//! Schemas are written in a subset of W3C XML Schema: element declarations
//! with sequences of child elements, simple types restricted by pattern,
//! length and enumeration facets, and a handful of built-in datatypes.
//! Loading compiles every pattern up front so a loaded [`Schema`] can be
//! shared read-only for the rest of the process.

pub mod bundled;
pub mod loader;
pub mod model;

pub use bundled::{SchemaShape, SchemaSource, SchemaSources};
pub use loader::SchemaLoader;
pub use model::{ContentModel, DataType, ElementDecl, Facets, Pattern, Schema, SimpleType};

use std::path::PathBuf;
use thiserror::Error;

/// XML Schema namespace
pub const XSD_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema";

/// Errors that can occur when loading a schema
#[derive(Error, Debug)]
pub enum Error {
    #[error("Schema not found: {0}")]
    NotFound(String),

    #[error("Failed to read schema '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Schema is not well-formed XML: {0}")]
    Xml(#[from] mediator_ir::Error),

    #[error("Invalid schema format: {0}")]
    InvalidFormat(String),

    #[error("Unsupported schema construct: {0}")]
    Unsupported(String),

    #[error("Unresolved type reference: {0}")]
    UnresolvedType(String),

    #[error("Invalid pattern '{pattern}': {message}")]
    Pattern { pattern: String, message: String },
}

/// Alias naming the setup-phase failure of the schema loader.
pub type SchemaLoadError = Error;

pub type Result<T> = std::result::Result<T, Error>;
