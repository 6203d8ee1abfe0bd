//! Generation runner — wires together inputs, the generator, and reporting.
//!
//! Three entry points:
//! - `run_generation()`: loads input tables from configured paths, then runs.
//!   Used by the CLI.
//! - `run_generation_with_inputs()`: takes pre-loaded tables and schema — no
//!   I/O. Used by tests.
//! - `run_generation_with_generator()`: takes a fully wired generator, which
//!   may carry a custom oracle.

use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use vizgen_core::distribution::{Definitions, DistributionError, Distributions};
use vizgen_core::domain::{Property, Spec};
use vizgen_core::model::SpecModel;
use vizgen_core::rng::RngHierarchy;
use vizgen_core::schema::{DataSchema, SchemaError};

use crate::config::{ConfigError, GenerationConfig};
use crate::generator::{Generator, GeneratorError};

/// Label for per-interaction rng streams.
const INTERACTION_STREAM: &str = "interaction";

/// Synthetic schemas carry one field of each type per channel, so any spec
/// the generator can name will resolve.
const SYNTHETIC_FIELDS_PER_TYPE: usize = 9;

/// Errors from the runner.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("distribution error: {0}")]
    Distribution(#[from] DistributionError),
    #[error("schema error: {0}")]
    Schema(#[from] SchemaError),
    #[error("invalid data schema: {0}")]
    InvalidSchema(String),
    #[error("generation error: {0}")]
    Generator(#[from] GeneratorError),
}

/// Current schema version for persisted artifacts.
pub const SCHEMA_VERSION: u32 = 1;

/// Default schema version for serde deserialization of older JSON without the field.
fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

/// Everything one interaction produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionRecord {
    /// Position in the run, 0-based.
    pub index: usize,
    /// Sub-seed this interaction's rng stream was derived from.
    pub seed: u64,
    /// Leaves visited before filtering.
    pub leaves: usize,
    /// Leaves the oracle accepted.
    pub accepted: usize,
    /// The accepted specs, in visit order.
    pub specs: Vec<Spec>,
}

impl InteractionRecord {
    /// Leaves the oracle turned away. Imported manifests are only
    /// version-checked, so an inconsistent record saturates at zero instead
    /// of underflowing.
    pub fn rejected(&self) -> usize {
        self.leaves.saturating_sub(self.accepted)
    }
}

/// Counts aggregated over all interactions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunTotals {
    pub leaves: usize,
    pub accepted: usize,
    pub rejected: usize,
}

/// Complete result of a generation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationReport {
    /// Schema version for forward-compatible deserialization.
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub run_id: String,
    pub seed: u64,
    pub timestamp: DateTime<Utc>,
    pub dimensions: usize,
    pub properties: Vec<Property>,
    pub interactions: Vec<InteractionRecord>,
    pub totals: RunTotals,
}

impl GenerationReport {
    /// All accepted specs across interactions, in run order.
    pub fn accepted_specs(&self) -> impl Iterator<Item = &Spec> {
        self.interactions.iter().flat_map(|record| record.specs.iter())
    }
}

/// Run generation from a GenerationConfig (loads tables from configured paths).
///
/// This is the high-level entry point used by the CLI. Paths left unset fall
/// back to the built-in popularity table, the default property split, and a
/// synthetic dataset schema.
pub fn run_generation(config: &GenerationConfig) -> Result<GenerationReport, RunError> {
    config.validate()?;

    let distributions = match &config.paths.distributions {
        Some(path) => Distributions::from_path(path)?,
        None => Distributions::default_table(),
    };
    let definitions = match &config.paths.definitions {
        Some(path) => Definitions::from_path(path)?,
        None => Definitions::default(),
    };
    let schema = match &config.paths.data_schema {
        Some(path) => DataSchema::from_path(path)?,
        None => DataSchema::synthetic(SYNTHETIC_FIELDS_PER_TYPE),
    };

    run_generation_with_inputs(config, distributions, definitions, schema)
}

/// Run generation with pre-loaded input tables — no I/O.
pub fn run_generation_with_inputs(
    config: &GenerationConfig,
    distributions: Distributions,
    definitions: Definitions,
    schema: DataSchema,
) -> Result<GenerationReport, RunError> {
    let validation = schema.validate();
    if !validation.is_valid {
        return Err(RunError::InvalidSchema(validation.errors.join("; ")));
    }

    let model = SpecModel::new(distributions, definitions)?;
    let generator = Generator::new(model, schema);
    run_generation_with_generator(config, &generator)
}

/// Run generation with a fully wired generator.
///
/// Interaction rng streams derive from the master seed by hash, so the
/// parallel and sequential paths produce identical reports apart from the
/// timestamp.
pub fn run_generation_with_generator(
    config: &GenerationConfig,
    generator: &Generator,
) -> Result<GenerationReport, RunError> {
    config.validate()?;

    let section = &config.generation;
    let props = section.properties.clone();
    let leaves = generator.expected_leaves(&props)?;
    let hierarchy = RngHierarchy::new(section.seed);

    let run_one = |index: usize| -> Result<InteractionRecord, RunError> {
        let seed = hierarchy.sub_seed(INTERACTION_STREAM, index as u64);
        let mut rng = hierarchy.rng_for(INTERACTION_STREAM, index as u64);
        let specs = generator.generate_interaction(&props, section.dimensions, &mut rng)?;
        Ok(InteractionRecord {
            index,
            seed,
            leaves,
            accepted: specs.len(),
            specs,
        })
    };

    let interactions: Vec<InteractionRecord> = if section.parallel {
        (0..section.interactions)
            .into_par_iter()
            .map(run_one)
            .collect::<Result<Vec<_>, _>>()?
    } else {
        (0..section.interactions)
            .map(run_one)
            .collect::<Result<Vec<_>, _>>()?
    };

    let totals = interactions.iter().fold(RunTotals::default(), |mut totals, record| {
        totals.leaves += record.leaves;
        totals.accepted += record.accepted;
        totals.rejected += record.rejected();
        totals
    });

    Ok(GenerationReport {
        schema_version: SCHEMA_VERSION,
        run_id: config.run_id(),
        seed: section.seed,
        timestamp: Utc::now(),
        dimensions: section.dimensions,
        properties: props,
        interactions,
        totals,
    })
}
