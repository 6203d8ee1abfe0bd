//! Interaction generation — exhaustive mutation of a random base spec.
//!
//! One interaction: draw a base spec, then expand it into every combination
//! of enum values over the caller's property list. Each leaf of that tree is
//! finalized (field names assigned, improvement pass run) and kept only if
//! the validity oracle accepts it against the dataset schema.
//!
//! The expansion is depth-first over an explicit frame stack rather than
//! native recursion; the branching factor is the product of the enum counts,
//! so property lists, not stack depth, bound the work. Visit order is
//! observable through the rng: a child is cloned and mutated at the moment
//! it is visited, before any of its later siblings.

use rand::Rng;
use std::collections::BTreeMap;

use thiserror::Error;

use vizgen_core::domain::{Property, Spec};
use vizgen_core::model::{ModelError, SpecModel};
use vizgen_core::schema::DataSchema;

use crate::oracle::{SchemaOracle, ValidationTask, ValidityOracle};

/// Errors from interaction generation.
#[derive(Debug, Error)]
pub enum GeneratorError {
    #[error(transparent)]
    Model(#[from] ModelError),
}

/// One node of the expansion tree.
///
/// `depth` counts the properties already applied on the path from the root;
/// `next_enum` is the child about to be visited. A frame at full depth is a
/// leaf.
struct Frame {
    spec: Spec,
    depth: usize,
    next_enum: usize,
}

/// Spec generator bound to a model, a dataset schema, and an oracle.
pub struct Generator {
    model: SpecModel,
    schema: DataSchema,
    oracle: Box<dyn ValidityOracle>,
}

impl Generator {
    /// Binds a model and schema, filtering through the reference
    /// [`SchemaOracle`].
    pub fn new(model: SpecModel, schema: DataSchema) -> Self {
        Self {
            model,
            schema,
            oracle: Box::new(SchemaOracle),
        }
    }

    /// Replaces the validity oracle.
    pub fn with_oracle(mut self, oracle: Box<dyn ValidityOracle>) -> Self {
        self.oracle = oracle;
        self
    }

    pub fn model(&self) -> &SpecModel {
        &self.model
    }

    pub fn schema(&self) -> &DataSchema {
        &self.schema
    }

    /// Number of leaves one interaction visits before filtering: the product
    /// of the enum counts over `props`. An empty list has exactly one leaf,
    /// the base spec itself.
    pub fn expected_leaves(&self, props: &[Property]) -> Result<usize, GeneratorError> {
        let mut leaves = 1usize;
        for &prop in props {
            leaves *= self.model.enums(prop)?.len();
        }
        Ok(leaves)
    }

    /// Runs one interaction: base spec, exhaustive expansion over `props`,
    /// finalization and filtering of every leaf.
    ///
    /// Output order is depth-first: outer properties vary slowest, and within
    /// one property the declared enum order is preserved. Rejected leaves are
    /// dropped without error.
    pub fn generate_interaction<R: Rng>(
        &self,
        props: &[Property],
        dimensions: usize,
        rng: &mut R,
    ) -> Result<Vec<Spec>, GeneratorError> {
        let base = self.model.generate_spec(dimensions, rng)?;

        // Owned copies; `enums` borrows the model, which mutation also needs.
        let enum_lists: Vec<Vec<String>> = props
            .iter()
            .map(|&prop| {
                self.model
                    .enums(prop)
                    .map(|names| names.into_iter().map(str::to_string).collect())
            })
            .collect::<Result<_, _>>()?;

        let mut accepted = Vec::new();
        let mut stack = vec![Frame { spec: base, depth: 0, next_enum: 0 }];

        while let Some(frame) = stack.last_mut() {
            if frame.depth == props.len() {
                let leaf = stack.pop().map(|frame| frame.spec);
                if let Some(mut leaf) = leaf {
                    self.finalize(&mut leaf, rng);
                    let task = ValidationTask::new(&leaf, &self.schema);
                    if self.oracle.is_valid(&task) {
                        accepted.push(leaf);
                    }
                }
                continue;
            }

            let enums = &enum_lists[frame.depth];
            if frame.next_enum >= enums.len() {
                stack.pop();
                continue;
            }

            let enum_name = &enums[frame.next_enum];
            frame.next_enum += 1;

            // Clone-per-branch: siblings never share a spec.
            let mut child = frame.spec.clone();
            let depth = frame.depth;
            self.model
                .mutate_prop(&mut child, props[depth], enum_name, rng)?;
            stack.push(Frame { spec: child, depth: depth + 1, next_enum: 0 });
        }

        Ok(accepted)
    }

    /// Finalizes one leaf in place: field names, then the improvement pass.
    fn finalize<R: Rng>(&self, spec: &mut Spec, rng: &mut R) {
        assign_field_names(spec);
        self.model.improve(spec, rng);
    }
}

/// Assigns deterministic field names to every typed encoding.
///
/// One counter per measurement type, starting at 1, walking the encoding map
/// in channel order: the first quantitative encoding becomes `q1`, the second
/// `q2`, and so on. Encodings without a type get no field name (the reference
/// oracle rejects those leaves).
pub fn assign_field_names(spec: &mut Spec) {
    let mut counters = BTreeMap::new();
    for encoding in spec.encoding.values_mut() {
        let Some(field_type) = encoding.field_type else {
            continue;
        };
        let counter = counters.entry(field_type).or_insert(1usize);
        encoding.field = Some(format!("{}{counter}", field_type.code()));
        *counter += 1;
    }
}
