//! Pipeline implementation

use crate::config::PipelineConfig;
use crate::context::MediationContext;
use crate::{MediationError, Result};
use mediator_codec::{EncodeOptions, decode, encode};
use mediator_ir::{NewRecord, OldRecord};
use mediator_mapping::Mediator;
use std::path::Path;
use tracing::{debug, info, warn};

/// Runs documents through decode, mediate and encode
#[derive(Debug, Clone)]
pub struct Pipeline {
    context: MediationContext,
    mediator: Mediator,
    options: EncodeOptions,
}

impl Pipeline {
    /// Create a new pipeline with the given context and configuration
    #[must_use]
    pub fn new(context: MediationContext, config: &PipelineConfig) -> Self {
        Self {
            context,
            mediator: Mediator::new(config.mapping_policy()),
            options: config.encode_options(),
        }
    }

    /// Create a pipeline over the bundled schemas with default configuration
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::SchemaLoad`] if a bundled schema fails to load.
    pub fn with_defaults() -> Result<Self> {
        Ok(Self::new(
            MediationContext::bundled()?,
            &PipelineConfig::default(),
        ))
    }

    /// Read and mediate one file, returning the encoded output
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Mediation`] when the file cannot be read or
    /// any stage rejects the document.
    pub fn process_file<P: AsRef<Path>>(&self, path: P) -> Result<Vec<u8>> {
        let path = path.as_ref();
        info!("Mediating {}", path.display());

        let bytes = std::fs::read(path).map_err(|source| MediationError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        self.process_bytes(&bytes)
    }

    /// Mediate one in-memory document, returning the encoded output
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Mediation`] when decoding or encoding fails.
    pub fn process_bytes(&self, bytes: &[u8]) -> Result<Vec<u8>> {
        let old = self.decode(bytes)?;
        let new = self.mediator.mediate(&old);
        debug!("Mediated record: {:?}", new);
        Ok(self.encode(&new)?)
    }

    fn decode(&self, bytes: &[u8]) -> std::result::Result<OldRecord, MediationError> {
        decode(bytes, self.context.old_schema()).map_err(|e| {
            warn!("Input rejected: {}", e);
            MediationError::Decode(e)
        })
    }

    fn encode(&self, record: &NewRecord) -> std::result::Result<Vec<u8>, MediationError> {
        let bytes = encode(record, self.context.new_schema(), &self.options).map_err(|e| {
            warn!("Output rejected: {}", e);
            MediationError::Encode(e)
        })?;
        info!("Mediation produced {} bytes", bytes.len());
        Ok(bytes)
    }
}
