//! VizGen Runner — generation orchestration, validation, and artifacts.
//!
//! This crate builds on `vizgen-core` to provide:
//! - TOML run configuration with content-addressed run IDs
//! - The exhaustive interaction generator (base spec + mutation tree)
//! - The validity-oracle seam and the schema reference oracle
//! - Sequential and parallel run execution with deterministic rng streams
//! - JSON/CSV report export with schema versioning

pub mod config;
pub mod export;
pub mod generator;
pub mod oracle;
pub mod runner;

pub use config::{ConfigError, GenerationConfig, GenerationSection, PathsSection, RunId};
pub use export::{
    export_json, export_specs_json, export_summary_csv, import_json, load_artifacts,
    save_artifacts, ExportError,
};
pub use generator::{assign_field_names, Generator, GeneratorError};
pub use oracle::{AcceptAll, SchemaOracle, ValidationTask, ValidityOracle};
pub use runner::{
    run_generation, run_generation_with_generator, run_generation_with_inputs, GenerationReport,
    InteractionRecord, RunError, RunTotals, SCHEMA_VERSION,
};

#[cfg(test)]
mod send_sync_checks {
    use super::*;

    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}

    #[test]
    fn config_types_are_send_sync() {
        assert_send::<GenerationConfig>();
        assert_sync::<GenerationConfig>();
    }

    #[test]
    fn generator_is_send_sync() {
        // Required for parallel runs: interactions borrow one generator.
        assert_send::<Generator>();
        assert_sync::<Generator>();
    }

    #[test]
    fn oracle_box_is_send_sync() {
        assert_send::<Box<dyn ValidityOracle>>();
        assert_sync::<Box<dyn ValidityOracle>>();
    }

    #[test]
    fn report_types_are_send_sync() {
        assert_send::<GenerationReport>();
        assert_sync::<GenerationReport>();
        assert_send::<InteractionRecord>();
        assert_sync::<InteractionRecord>();
        assert_send::<RunTotals>();
        assert_sync::<RunTotals>();
    }
}
