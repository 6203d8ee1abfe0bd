//! VizGen Core — chart-spec domain types, distribution tables, sampling,
//! mutation, and improvement passes.
//!
//! This crate contains the heart of the candidate generator:
//! - Domain types (specs, encodings, marks, channels, typed property values)
//! - Popularity-weighted distribution tables and definitions splits
//! - Cumulative-weight sampling over enum pools
//! - Spec generation (channels drawn without replacement) and single-property
//!   mutation
//! - Ordered improvement passes that repair unreasonable specs
//! - Deterministic BLAKE3-derived RNG hierarchy

pub mod distribution;
pub mod domain;
pub mod improve;
pub mod model;
pub mod rng;
pub mod sample;
pub mod schema;
