//! Spec generation and mutation.
//!
//! [`SpecModel`] binds a distribution table to a definitions split and
//! exposes the pipeline primitives:
//! - [`SpecModel::generate_spec`] draws a fresh spec with n encodings
//! - [`SpecModel::mutate_prop`] rewrites one property on an existing spec
//! - [`SpecModel::improve`] runs the improvement pass
//!
//! The model itself is immutable and shareable. Channel pools are consumed
//! without replacement, but only inside a single `generate_spec` call; the
//! next call starts from the full pool again.

use rand::Rng;
use std::collections::BTreeSet;

use thiserror::Error;

use crate::distribution::{Definitions, DistributionError, Distributions};
use crate::domain::{Channel, Encoding, Property, PropValue, Spec, UnknownEnumError};
use crate::improve::ImprovementPass;
use crate::sample::{self, SampleError};

/// Errors from generation and mutation.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("property '{0}' cannot be mutated (not a top-level or encoding property)")]
    InvalidProperty(Property),
    #[error("channel pool exhausted: {requested} encodings requested, {available} channels declared")]
    ExhaustedDomain { requested: usize, available: usize },
    #[error("no distribution declared for property '{0}'")]
    MissingDistribution(Property),
    #[error(transparent)]
    UnknownEnum(#[from] UnknownEnumError),
    #[error("sampling failed: {0}")]
    Sample(#[from] SampleError),
}

/// Distribution-driven spec model.
#[derive(Debug)]
pub struct SpecModel {
    distributions: Distributions,
    definitions: Definitions,
    improvements: ImprovementPass,
}

impl SpecModel {
    /// Binds a table and a definitions split, using the standard improvement
    /// pass. Fails when the definitions reference properties the table does
    /// not declare (or place them in an impossible role).
    pub fn new(
        distributions: Distributions,
        definitions: Definitions,
    ) -> Result<Self, DistributionError> {
        distributions.validate_definitions(&definitions)?;
        Ok(Self {
            distributions,
            definitions,
            improvements: ImprovementPass::standard(),
        })
    }

    /// Replaces the improvement pass.
    pub fn with_improvements(mut self, improvements: ImprovementPass) -> Self {
        self.improvements = improvements;
        self
    }

    pub fn distributions(&self) -> &Distributions {
        &self.distributions
    }

    pub fn definitions(&self) -> &Definitions {
        &self.definitions
    }

    /// Enum names a property can take, in table order.
    pub fn enums(&self, property: Property) -> Result<Vec<&str>, ModelError> {
        self.distributions
            .enum_names(property)
            .ok_or(ModelError::MissingDistribution(property))
    }

    // ─── Generation ──────────────────────────────────────────────────────────

    /// Draws a fresh spec with `dimensions` encodings.
    ///
    /// Top-level properties are included by coin flip and sampled from their
    /// pools. Each encoding is built the same way, then bound to a channel
    /// drawn without replacement, so no two encodings share a channel.
    pub fn generate_spec<R: Rng>(
        &self,
        dimensions: usize,
        rng: &mut R,
    ) -> Result<Spec, ModelError> {
        let channel_dist = self
            .distributions
            .get(Property::Channel)
            .ok_or(ModelError::MissingDistribution(Property::Channel))?;
        // Working copies; the model's own table is never consumed.
        let mut pool_names = channel_dist.names();
        let mut pool_weights = channel_dist.weights();
        let available = pool_names.len();

        let mut spec = Spec::default();
        for &property in &self.definitions.top_level_props {
            if !self.coin(property, rng)? {
                continue;
            }
            let value = self.sample_value(property, rng)?;
            if !spec.set_top_level(value) {
                return Err(ModelError::InvalidProperty(property));
            }
        }

        for _ in 0..dimensions {
            // The encoding is built before its channel is drawn.
            let encoding = self.generate_encoding(rng)?;
            if pool_names.is_empty() {
                return Err(ModelError::ExhaustedDomain { requested: dimensions, available });
            }
            let (_, index) = sample::sample(&pool_names, &pool_weights, rng)?;
            let name = pool_names.remove(index);
            pool_weights.remove(index);
            let channel: Channel = name.parse()?;
            spec.encoding.insert(channel, encoding);
        }
        Ok(spec)
    }

    fn generate_encoding<R: Rng>(&self, rng: &mut R) -> Result<Encoding, ModelError> {
        let mut encoding = Encoding::default();
        for &property in &self.definitions.encoding_props {
            if !self.coin(property, rng)? {
                continue;
            }
            let value = self.sample_value(property, rng)?;
            if !encoding.set(value) {
                return Err(ModelError::InvalidProperty(property));
            }
        }
        Ok(encoding)
    }

    /// Inclusion coin: true with the property's inclusion probability.
    fn coin<R: Rng>(&self, property: Property, rng: &mut R) -> Result<bool, ModelError> {
        let probability = self
            .distributions
            .inclusion_probability(property)
            .ok_or(ModelError::MissingDistribution(property))?;
        Ok(rng.gen::<f64>() < probability)
    }

    fn sample_value<R: Rng>(&self, property: Property, rng: &mut R) -> Result<PropValue, ModelError> {
        let dist = self
            .distributions
            .get(property)
            .ok_or(ModelError::MissingDistribution(property))?;
        let names = dist.names();
        let weights = dist.weights();
        let (name, _) = sample::sample(&names, &weights, rng)?;
        Ok(PropValue::build(property, name)?)
    }

    // ─── Mutation ────────────────────────────────────────────────────────────

    /// Sets `property` to `enum_name` somewhere on the spec.
    ///
    /// - Top-level properties overwrite the spec's field directly.
    /// - The channel property renames an existing encoding: a victim is
    ///   drawn with weight `1 - w` (unpopular channels are evicted first)
    ///   and its encoding moves to the new channel. Renaming onto a channel
    ///   already in use is a no-op.
    /// - Encoding properties pick a target channel with weight `w` (popular
    ///   channels attract mutations) and overwrite that encoding's value.
    ///
    /// Properties in no group are rejected with
    /// [`ModelError::InvalidProperty`]. A property listed both top-level and
    /// encoding-level is treated as top-level.
    pub fn mutate_prop<R: Rng>(
        &self,
        spec: &mut Spec,
        property: Property,
        enum_name: &str,
        rng: &mut R,
    ) -> Result<(), ModelError> {
        if self.definitions.is_top_level(property) {
            let value = PropValue::build(property, enum_name)?;
            if !spec.set_top_level(value) {
                return Err(ModelError::InvalidProperty(property));
            }
            return Ok(());
        }

        if property == Property::Channel {
            return self.rename_channel(spec, enum_name, rng);
        }

        if self.definitions.is_encoding(property) {
            let value = PropValue::build(property, enum_name)?;
            let target = self.sample_used_channel(spec, false, rng)?;
            if let Some(encoding) = spec.encoding.get_mut(&target) {
                if !encoding.set(value) {
                    return Err(ModelError::InvalidProperty(property));
                }
            }
            return Ok(());
        }

        Err(ModelError::InvalidProperty(property))
    }

    fn rename_channel<R: Rng>(
        &self,
        spec: &mut Spec,
        enum_name: &str,
        rng: &mut R,
    ) -> Result<(), ModelError> {
        let target: Channel = enum_name.parse()?;
        if spec.encoding.contains_key(&target) {
            return Ok(());
        }
        let victim = self.sample_used_channel(spec, true, rng)?;
        if let Some(encoding) = spec.encoding.remove(&victim) {
            spec.encoding.insert(target, encoding);
        }
        Ok(())
    }

    /// Weighted draw over the channels a spec currently uses.
    ///
    /// `invert` flips popularity (weight `1 - w`, floored at zero): eviction
    /// prefers unpopular channels, modification prefers popular ones.
    fn sample_used_channel<R: Rng>(
        &self,
        spec: &Spec,
        invert: bool,
        rng: &mut R,
    ) -> Result<Channel, ModelError> {
        let used = spec.used_channels();
        let mut weights = Vec::with_capacity(used.len());
        let mut total = 0.0;
        for channel in &used {
            let weight = self
                .distributions
                .weight_of(Property::Channel, channel.as_str())
                .ok_or_else(|| {
                    ModelError::UnknownEnum(UnknownEnumError {
                        property: Property::Channel,
                        name: channel.as_str().to_string(),
                    })
                })?;
            let weight = if invert { (1.0 - weight).max(0.0) } else { weight };
            total += weight;
            weights.push(weight);
        }
        // Every derived weight can legitimately be zero: inverting a
        // popularity-1 channel, or a sole zero-weight channel. The zero-width
        // cumulative draw lands on the first entry; only an empty spec is an
        // error.
        if !used.is_empty() && total <= 0.0 {
            return Ok(used[0]);
        }
        let (channel, _) = sample::sample(&used, &weights, rng)?;
        Ok(*channel)
    }

    // ─── Queries ─────────────────────────────────────────────────────────────

    /// Enum names `spec` currently uses for `property`.
    ///
    /// Stored values unpack back to their enum names; the channel property
    /// reports the channels in use. A property listed in both groups reads
    /// as top-level, matching mutation.
    pub fn used_enums(&self, spec: &Spec, property: Property) -> BTreeSet<String> {
        let mut used = BTreeSet::new();
        if property == Property::Channel {
            for channel in spec.encoding.keys() {
                used.insert(channel.as_str().to_string());
            }
            return used;
        }
        if self.definitions.is_top_level(property) {
            if let Some(name) = spec.top_level_enum_name(property) {
                used.insert(name);
            }
            return used;
        }
        if self.definitions.is_encoding(property) {
            for encoding in spec.encoding.values() {
                if let Some(name) = encoding.enum_name_of(property) {
                    used.insert(name);
                }
            }
        }
        used
    }

    /// Runs the improvement pass on a finished spec.
    pub fn improve<R: Rng>(&self, spec: &mut Spec, rng: &mut R) {
        self.improvements.apply_all(spec, rng);
    }
}
