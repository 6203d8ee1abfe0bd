use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// A spec property the pipeline can sample or mutate.
///
/// Each property owns a pool of enum names in the distribution table. The
/// field type property is spelled `"type"` in tables, configs, and emitted
/// specs; the Rust name avoids the keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Property {
    Mark,
    Channel,
    #[serde(rename = "type")]
    FieldType,
    Aggregate,
    Bin,
    Scale,
}

impl Property {
    /// Config-file spelling of the property.
    pub fn as_str(&self) -> &'static str {
        match self {
            Property::Mark => "mark",
            Property::Channel => "channel",
            Property::FieldType => "type",
            Property::Aggregate => "aggregate",
            Property::Bin => "bin",
            Property::Scale => "scale",
        }
    }
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error for a property name that is not part of the vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown property '{0}'")]
pub struct ParsePropertyError(pub String);

impl FromStr for Property {
    type Err = ParsePropertyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mark" => Ok(Property::Mark),
            "channel" => Ok(Property::Channel),
            "type" => Ok(Property::FieldType),
            "aggregate" => Ok(Property::Aggregate),
            "bin" => Ok(Property::Bin),
            "scale" => Ok(Property::Scale),
            other => Err(ParsePropertyError(other.to_string())),
        }
    }
}
