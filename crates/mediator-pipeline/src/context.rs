//! Mediation context

use crate::{Error, Result};
use mediator_schema::{Schema, SchemaLoader, SchemaShape, SchemaSources};
use tracing::info;

/// Both schemas, loaded once and read-only afterwards
#[derive(Debug, Clone)]
pub struct MediationContext {
    old: Schema,
    new: Schema,
}

impl MediationContext {
    /// Load the bundled schemas
    ///
    /// # Errors
    ///
    /// Returns [`Error::SchemaLoad`] if a bundled definition fails to load.
    pub fn bundled() -> Result<Self> {
        Self::load(&SchemaSources::bundled())
    }

    /// Load both schemas from the given sources, stopping at the first failure
    ///
    /// # Errors
    ///
    /// Returns [`Error::SchemaLoad`] naming the shape that failed.
    pub fn load(sources: &SchemaSources) -> Result<Self> {
        let loader = SchemaLoader::new();
        let load = |shape: SchemaShape| {
            loader
                .load(shape, sources.get(shape))
                .map_err(|source| Error::SchemaLoad { shape, source })
        };

        let context = Self {
            old: load(SchemaShape::Old)?,
            new: load(SchemaShape::New)?,
        };
        info!(
            "Mediation context ready (old: {}, new: {})",
            context.old.origin, context.new.origin
        );
        Ok(context)
    }

    /// Schema of input documents
    #[must_use]
    pub fn old_schema(&self) -> &Schema {
        &self.old
    }

    /// Schema of output documents
    #[must_use]
    pub fn new_schema(&self) -> &Schema {
        &self.new
    }
}
