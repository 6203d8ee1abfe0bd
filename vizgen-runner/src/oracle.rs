//! Validity oracle seam.
//!
//! The generator produces far more candidates than any dataset can support;
//! an oracle decides, per candidate, whether the spec is acceptable against
//! the dataset schema. The oracle's internal logic is its own concern — the
//! generator only needs the pass/fail answer.

use vizgen_core::domain::Spec;
use vizgen_core::schema::DataSchema;

/// One candidate-and-schema pair handed to an oracle.
#[derive(Debug, Clone, Copy)]
pub struct ValidationTask<'a> {
    pub spec: &'a Spec,
    pub schema: &'a DataSchema,
}

impl<'a> ValidationTask<'a> {
    pub fn new(spec: &'a Spec, schema: &'a DataSchema) -> Self {
        Self { spec, schema }
    }
}

/// Decides whether a finalized candidate is acceptable.
///
/// Oracles are consulted once per leaf, after field names are assigned and
/// the improvement pass has run. Rejection is not an error; rejected leaves
/// are silently dropped.
pub trait ValidityOracle: Send + Sync {
    /// Stable name, for logs and run manifests.
    fn name(&self) -> &'static str;

    fn is_valid(&self, task: &ValidationTask<'_>) -> bool;
}

/// Reference oracle: every encoding must resolve against the schema.
///
/// An encoding passes when it carries both a type and a field, the field
/// exists in the schema, and the schema agrees on the field's type. A spec
/// with no encodings passes vacuously.
#[derive(Debug, Clone, Copy, Default)]
pub struct SchemaOracle;

impl ValidityOracle for SchemaOracle {
    fn name(&self) -> &'static str {
        "schema"
    }

    fn is_valid(&self, task: &ValidationTask<'_>) -> bool {
        task.spec.encoding.values().all(|encoding| {
            let (Some(field_type), Some(field)) = (encoding.field_type, &encoding.field) else {
                return false;
            };
            task.schema
                .get(field)
                .is_some_and(|schema_field| schema_field.field_type == field_type)
        })
    }
}

/// Test oracle: accepts every candidate.
///
/// Useful for asserting pre-filter leaf counts without schema noise.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAll;

impl ValidityOracle for AcceptAll {
    fn name(&self) -> &'static str {
        "accept_all"
    }

    fn is_valid(&self, _task: &ValidationTask<'_>) -> bool {
        true
    }
}
