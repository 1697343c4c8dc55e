#![deny(rust_2018_idioms)]
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

//! # mediator-pipeline
//!
//! Orchestration of a single mediation run.
//!
//! A run has a setup phase and a processing phase. Setup builds a
//! [`MediationContext`] holding both loaded schemas and fails fast if either
//! cannot be loaded. Processing takes one input document through
//! decode, mediate and encode and returns the complete output, or a
//! [`MediationError`] naming the stage that rejected it.

pub mod config;
pub mod context;
pub mod pipeline;

pub use config::{OutputConfig, PipelineConfig};
pub use context::MediationContext;
pub use pipeline::Pipeline;

use mediator_codec::{DecodeError, EncodeError};
use mediator_schema::{SchemaLoadError, SchemaShape};
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur in the pipeline
#[derive(Error, Debug)]
pub enum Error {
    #[error("Failed to load the {shape} schema")]
    SchemaLoad {
        shape: SchemaShape,
        #[source]
        source: SchemaLoadError,
    },

    #[error("Failed to read configuration '{}'", path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid configuration '{}'", path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error(transparent)]
    Mediation(#[from] MediationError),
}

/// Failure of a single document, reported as one "mediation failed" signal
#[derive(Error, Debug)]
pub enum MediationError {
    #[error("mediation failed: cannot read '{}'", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("mediation failed: input document rejected")]
    Decode(#[from] DecodeError),

    #[error("mediation failed: output document rejected")]
    Encode(#[from] EncodeError),
}

impl Error {
    /// The per-document failure, if this is one
    #[must_use]
    pub fn as_mediation(&self) -> Option<&MediationError> {
        match self {
            Self::Mediation(error) => Some(error),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_mediation_errors_share_a_prefix() {
        let read = MediationError::Read {
            path: PathBuf::from("/tmp/input.xml"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        };
        let error = Error::from(read);

        assert!(error.to_string().starts_with("mediation failed"));
        assert!(error.to_string().contains("/tmp/input.xml"));
        assert_eq!(error.source().map(ToString::to_string).as_deref(), Some("gone"));
        assert!(error.as_mediation().is_some());
    }

    #[test]
    fn test_schema_load_error_names_shape() {
        let error = Error::SchemaLoad {
            shape: SchemaShape::New,
            source: SchemaLoadError::NotFound("NewSchema.xsd".to_string()),
        };
        assert_eq!(error.to_string(), "Failed to load the new schema");
        assert!(error.source().unwrap().to_string().contains("NewSchema.xsd"));
        assert!(error.as_mediation().is_none());
    }
}
