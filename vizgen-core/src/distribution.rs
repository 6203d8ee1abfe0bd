//! Popularity-weighted distribution tables.
//!
//! A [`Distributions`] table drives every random decision the generator
//! makes: one entry per property, holding an inclusion probability (chance
//! the property appears at all) and a weighted pool of enum names. Weights
//! are raw popularity counts, never normalized.
//!
//! [`Definitions`] splits the mutable properties into top-level and
//! encoding-level groups. The channel property belongs to neither group; the
//! generator assigns channels itself, consuming the pool without replacement.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::domain::{Property, PropValue, UnknownEnumError};

/// Errors from loading or validating distribution tables and definitions.
#[derive(Debug, Error)]
pub enum DistributionError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse distribution JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("distribution table is empty")]
    EmptyTable,
    #[error("distribution table has no 'channel' entry")]
    MissingChannel,
    #[error("property '{0}' declares no values")]
    NoValues(Property),
    #[error("property '{property}' value '{name}' has invalid weight {weight}")]
    InvalidWeight {
        property: Property,
        name: String,
        weight: f64,
    },
    #[error("property '{0}' has non-positive total weight")]
    NonPositiveTotal(Property),
    #[error("property '{property}' has inclusion probability {probability} outside [0, 1]")]
    InvalidInclusion { property: Property, probability: f64 },
    #[error(transparent)]
    UnknownEnum(#[from] UnknownEnumError),
    #[error("'channel' cannot be listed in definitions; channels are assigned by the generator")]
    ChannelListed,
    #[error("property '{property}' cannot be used as a {role} property")]
    WrongRole {
        property: Property,
        role: &'static str,
    },
    #[error("definitions reference property '{0}' with no distribution entry")]
    UndeclaredProperty(Property),
}

/// One enum name with its popularity weight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightedValue {
    pub name: String,
    pub probability: f64,
}

impl WeightedValue {
    pub fn new(name: impl Into<String>, probability: f64) -> Self {
        Self { name: name.into(), probability }
    }
}

/// Distribution entry for one property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyDistribution {
    /// Probability the property is included when a spec or encoding is built.
    pub probability: f64,
    /// Enum pool in declared order. Order is observable: it fixes both the
    /// mutation fan-out order and the index a sampler draw maps to.
    pub values: Vec<WeightedValue>,
}

impl PropertyDistribution {
    pub fn names(&self) -> Vec<&str> {
        self.values.iter().map(|v| v.name.as_str()).collect()
    }

    pub fn weights(&self) -> Vec<f64> {
        self.values.iter().map(|v| v.probability).collect()
    }
}

// ─── Distributions ───────────────────────────────────────────────────────────

/// Validated table of property distributions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Distributions {
    table: BTreeMap<Property, PropertyDistribution>,
}

impl Distributions {
    /// Builds a table from raw entries, rejecting malformed input.
    pub fn new(
        table: BTreeMap<Property, PropertyDistribution>,
    ) -> Result<Self, DistributionError> {
        let distributions = Self { table };
        distributions.validate()?;
        Ok(distributions)
    }

    /// Parses a table from its JSON form:
    /// `{"mark": {"probability": 1.0, "values": [{"name": "bar", "probability": 1.0}]}}`.
    pub fn from_json_str(json: &str) -> Result<Self, DistributionError> {
        let table: BTreeMap<Property, PropertyDistribution> = serde_json::from_str(json)?;
        Self::new(table)
    }

    pub fn from_path(path: &Path) -> Result<Self, DistributionError> {
        let json = fs::read_to_string(path).map_err(|source| DistributionError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// Built-in table with popularity weights for all six properties.
    pub fn default_table() -> Self {
        let mut table = BTreeMap::new();
        table.insert(
            Property::Mark,
            PropertyDistribution {
                probability: 1.0,
                values: vec![
                    WeightedValue::new("point", 1.2),
                    WeightedValue::new("bar", 1.0),
                    WeightedValue::new("line", 0.9),
                    WeightedValue::new("area", 0.4),
                    WeightedValue::new("text", 0.3),
                    WeightedValue::new("tick", 0.3),
                    WeightedValue::new("rect", 0.25),
                    WeightedValue::new("circle", 0.2),
                    WeightedValue::new("square", 0.1),
                ],
            },
        );
        table.insert(
            Property::Channel,
            PropertyDistribution {
                probability: 1.0,
                values: vec![
                    WeightedValue::new("x", 1.0),
                    WeightedValue::new("y", 0.95),
                    WeightedValue::new("color", 0.5),
                    WeightedValue::new("size", 0.3),
                    WeightedValue::new("shape", 0.2),
                    WeightedValue::new("text", 0.2),
                    WeightedValue::new("row", 0.15),
                    WeightedValue::new("column", 0.15),
                    WeightedValue::new("detail", 0.1),
                ],
            },
        );
        table.insert(
            Property::FieldType,
            PropertyDistribution {
                probability: 1.0,
                values: vec![
                    WeightedValue::new("quantitative", 1.0),
                    WeightedValue::new("nominal", 0.8),
                    WeightedValue::new("ordinal", 0.45),
                    WeightedValue::new("temporal", 0.3),
                ],
            },
        );
        table.insert(
            Property::Aggregate,
            PropertyDistribution {
                probability: 0.35,
                values: vec![
                    WeightedValue::new("mean", 1.0),
                    WeightedValue::new("sum", 0.7),
                    WeightedValue::new("count", 0.6),
                    WeightedValue::new("min", 0.3),
                    WeightedValue::new("max", 0.3),
                    WeightedValue::new("median", 0.2),
                ],
            },
        );
        table.insert(
            Property::Bin,
            PropertyDistribution {
                probability: 0.15,
                values: vec![
                    WeightedValue::new("10", 1.0),
                    WeightedValue::new("25", 0.35),
                    WeightedValue::new("200", 0.1),
                ],
            },
        );
        table.insert(
            Property::Scale,
            PropertyDistribution {
                probability: 0.1,
                values: vec![
                    WeightedValue::new("zero", 0.7),
                    WeightedValue::new("log", 0.3),
                ],
            },
        );
        Self { table }
    }

    fn validate(&self) -> Result<(), DistributionError> {
        if self.table.is_empty() {
            return Err(DistributionError::EmptyTable);
        }
        if !self.table.contains_key(&Property::Channel) {
            return Err(DistributionError::MissingChannel);
        }
        for (&property, dist) in &self.table {
            if !(0.0..=1.0).contains(&dist.probability) || !dist.probability.is_finite() {
                return Err(DistributionError::InvalidInclusion {
                    property,
                    probability: dist.probability,
                });
            }
            if dist.values.is_empty() {
                return Err(DistributionError::NoValues(property));
            }
            let mut total = 0.0;
            for value in &dist.values {
                if !value.probability.is_finite() || value.probability < 0.0 {
                    return Err(DistributionError::InvalidWeight {
                        property,
                        name: value.name.clone(),
                        weight: value.probability,
                    });
                }
                total += value.probability;
                // Every declared name must expand to a typed value.
                PropValue::build(property, &value.name)?;
            }
            if total <= 0.0 {
                return Err(DistributionError::NonPositiveTotal(property));
            }
        }
        Ok(())
    }

    /// Checks that a definitions split is usable with this table.
    pub fn validate_definitions(&self, definitions: &Definitions) -> Result<(), DistributionError> {
        for &property in &definitions.top_level_props {
            if property == Property::Channel {
                return Err(DistributionError::ChannelListed);
            }
            if !matches!(property, Property::Mark | Property::Scale) {
                return Err(DistributionError::WrongRole { property, role: "top-level" });
            }
            if !self.table.contains_key(&property) {
                return Err(DistributionError::UndeclaredProperty(property));
            }
        }
        for &property in &definitions.encoding_props {
            if property == Property::Channel {
                return Err(DistributionError::ChannelListed);
            }
            if !matches!(
                property,
                Property::FieldType | Property::Aggregate | Property::Bin | Property::Scale
            ) {
                return Err(DistributionError::WrongRole { property, role: "encoding" });
            }
            if !self.table.contains_key(&property) {
                return Err(DistributionError::UndeclaredProperty(property));
            }
        }
        Ok(())
    }

    pub fn get(&self, property: Property) -> Option<&PropertyDistribution> {
        self.table.get(&property)
    }

    pub fn inclusion_probability(&self, property: Property) -> Option<f64> {
        self.table.get(&property).map(|d| d.probability)
    }

    /// Enum names declared for a property, in table order.
    pub fn enum_names(&self, property: Property) -> Option<Vec<&str>> {
        self.table.get(&property).map(|d| d.names())
    }

    /// Popularity weight of one enum name.
    pub fn weight_of(&self, property: Property, enum_name: &str) -> Option<f64> {
        self.table
            .get(&property)?
            .values
            .iter()
            .find(|v| v.name == enum_name)
            .map(|v| v.probability)
    }

    pub fn properties(&self) -> impl Iterator<Item = Property> + '_ {
        self.table.keys().copied()
    }
}

// ─── Definitions ─────────────────────────────────────────────────────────────

/// Split of mutable properties into top-level and encoding-level groups.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Definitions {
    pub top_level_props: Vec<Property>,
    pub encoding_props: Vec<Property>,
}

impl Default for Definitions {
    fn default() -> Self {
        Self {
            top_level_props: vec![Property::Mark],
            encoding_props: vec![
                Property::FieldType,
                Property::Aggregate,
                Property::Bin,
                Property::Scale,
            ],
        }
    }
}

impl Definitions {
    pub fn from_json_str(json: &str) -> Result<Self, DistributionError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: &Path) -> Result<Self, DistributionError> {
        let json = fs::read_to_string(path).map_err(|source| DistributionError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    pub fn is_top_level(&self, property: Property) -> bool {
        self.top_level_props.contains(&property)
    }

    pub fn is_encoding(&self, property: Property) -> bool {
        self.encoding_props.contains(&property)
    }
}
