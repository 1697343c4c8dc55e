//! Pipeline configuration

use crate::{Error, Result};
use mediator_codec::EncodeOptions;
use mediator_codec::encoder::PRETTY_INDENT;
use mediator_mapping::{MappingPolicy, ValueCase};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Pipeline configuration, typically loaded from YAML
///
/// ```yaml
/// value-case: lower-case
/// output:
///   xml-declaration: true
///   pretty: false
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct PipelineConfig {
    /// How the detail value is copied during mediation
    pub value_case: ValueCase,
    /// Output rendering
    pub output: OutputConfig,
}

/// How encoded documents are rendered
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct OutputConfig {
    /// Write an XML declaration before the root element
    pub xml_declaration: bool,
    /// Indent nested elements
    pub pretty: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            xml_declaration: true,
            pretty: false,
        }
    }
}

impl PipelineConfig {
    /// Parse a configuration from YAML text
    ///
    /// # Errors
    ///
    /// Returns the YAML error for malformed text, unknown keys, or unknown
    /// policy names.
    pub fn from_yaml_str(yaml: &str) -> std::result::Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    /// Load a configuration file
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigRead`] if the file cannot be read and
    /// [`Error::ConfigParse`] if it is not a valid configuration.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| Error::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_yaml_str(&content).map_err(|source| Error::ConfigParse {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("Loaded configuration from {}: {:?}", path.display(), config);
        Ok(config)
    }

    /// Mediation policy described by this configuration
    #[must_use]
    pub fn mapping_policy(&self) -> MappingPolicy {
        MappingPolicy::new().with_value_case(self.value_case)
    }

    /// Encoder options described by this configuration
    #[must_use]
    pub fn encode_options(&self) -> EncodeOptions {
        EncodeOptions {
            xml_declaration: self.output.xml_declaration,
            indent: self.output.pretty.then_some(PRETTY_INDENT),
        }
    }
}
