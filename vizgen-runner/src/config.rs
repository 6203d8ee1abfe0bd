//! Serializable generation run configuration.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use vizgen_core::domain::Property;

/// Unique identifier for a generation run (content-addressable hash).
pub type RunId = String;

/// Errors from configuration loading and validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("interactions must be at least 1, got {0}")]
    NoInteractions(usize),
}

/// Complete configuration for one generation run.
///
/// This struct captures all parameters needed to reproduce a run: the master
/// seed, the sampling shape (dimensions), the mutation axes (properties), and
/// the input tables. Two runs with identical configs produce identical specs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GenerationConfig {
    /// Generation parameters
    #[serde(default)]
    pub generation: GenerationSection,

    /// Optional input file overrides
    #[serde(default)]
    pub paths: PathsSection,
}

/// The `[generation]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GenerationSection {
    /// Master seed for the run
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Number of encodings per base spec
    #[serde(default = "default_dimensions")]
    pub dimensions: usize,

    /// Number of independent base specs to expand
    #[serde(default = "default_interactions")]
    pub interactions: usize,

    /// Properties to mutate over, outermost first
    #[serde(default = "default_properties")]
    pub properties: Vec<Property>,

    /// Expand interactions on the rayon pool instead of sequentially
    #[serde(default)]
    pub parallel: bool,
}

/// The `[paths]` section. Absent entries fall back to the built-in tables
/// and a synthetic dataset schema.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PathsSection {
    /// Popularity distribution table (JSON)
    pub distributions: Option<PathBuf>,

    /// Top-level / encoding property split (JSON)
    pub definitions: Option<PathBuf>,

    /// Dataset schema to validate against (JSON)
    pub data_schema: Option<PathBuf>,
}

fn default_seed() -> u64 {
    42
}

fn default_dimensions() -> usize {
    1
}

fn default_interactions() -> usize {
    1
}

fn default_properties() -> Vec<Property> {
    vec![Property::Mark]
}

impl Default for GenerationSection {
    fn default() -> Self {
        Self {
            seed: default_seed(),
            dimensions: default_dimensions(),
            interactions: default_interactions(),
            properties: default_properties(),
            parallel: false,
        }
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            generation: GenerationSection::default(),
            paths: PathsSection::default(),
        }
    }
}

impl GenerationConfig {
    /// Parses a TOML document. Missing sections and fields take defaults.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and parses a TOML config file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Rejects configurations that cannot drive a run.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.generation.interactions == 0 {
            return Err(ConfigError::NoInteractions(self.generation.interactions));
        }
        Ok(())
    }

    /// Computes a deterministic hash ID for this configuration.
    ///
    /// This lets artifacts from identical configs land in recognizably
    /// related directories and makes reports self-describing.
    pub fn run_id(&self) -> RunId {
        let json = serde_json::to_string(self).expect("GenerationConfig serialization failed");
        let hash = blake3::hash(json.as_bytes());
        format!("{}", hash.to_hex())
    }
}
