//! Typed values behind enum names.
//!
//! Distribution tables speak in flat enum names (`"bar"`, `"x"`, `"10"`,
//! `"zero"`). Specs carry typed values. [`PropValue::build`] expands a name
//! into its value and [`PropValue::enum_name`] collapses it back, so for
//! every declared name `build(p, e)?.enum_name() == e`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::domain::property::Property;

/// Error for an enum name that is not valid for the property it was used with.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown enum '{name}' for property '{property}'")]
pub struct UnknownEnumError {
    pub property: Property,
    pub name: String,
}

impl UnknownEnumError {
    fn new(property: Property, name: &str) -> Self {
        Self { property, name: name.to_string() }
    }
}

// ─── Mark ────────────────────────────────────────────────────────────────────

/// Mark type of a chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mark {
    Area,
    Bar,
    Circle,
    Line,
    Point,
    Rect,
    Square,
    Text,
    Tick,
}

impl Mark {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mark::Area => "area",
            Mark::Bar => "bar",
            Mark::Circle => "circle",
            Mark::Line => "line",
            Mark::Point => "point",
            Mark::Rect => "rect",
            Mark::Square => "square",
            Mark::Text => "text",
            Mark::Tick => "tick",
        }
    }
}

impl fmt::Display for Mark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Mark {
    type Err = UnknownEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "area" => Ok(Mark::Area),
            "bar" => Ok(Mark::Bar),
            "circle" => Ok(Mark::Circle),
            "line" => Ok(Mark::Line),
            "point" => Ok(Mark::Point),
            "rect" => Ok(Mark::Rect),
            "square" => Ok(Mark::Square),
            "text" => Ok(Mark::Text),
            "tick" => Ok(Mark::Tick),
            other => Err(UnknownEnumError::new(Property::Mark, other)),
        }
    }
}

// ─── Channel ─────────────────────────────────────────────────────────────────

/// Encoding channel. Declaration order doubles as the canonical ordering, so
/// encoding maps keyed by channel iterate x, y, color, ... deterministically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    X,
    Y,
    Color,
    Size,
    Shape,
    Text,
    Row,
    Column,
    Detail,
}

impl Channel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::X => "x",
            Channel::Y => "y",
            Channel::Color => "color",
            Channel::Size => "size",
            Channel::Shape => "shape",
            Channel::Text => "text",
            Channel::Row => "row",
            Channel::Column => "column",
            Channel::Detail => "detail",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Channel {
    type Err = UnknownEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "x" => Ok(Channel::X),
            "y" => Ok(Channel::Y),
            "color" => Ok(Channel::Color),
            "size" => Ok(Channel::Size),
            "shape" => Ok(Channel::Shape),
            "text" => Ok(Channel::Text),
            "row" => Ok(Channel::Row),
            "column" => Ok(Channel::Column),
            "detail" => Ok(Channel::Detail),
            other => Err(UnknownEnumError::new(Property::Channel, other)),
        }
    }
}

// ─── Field type ──────────────────────────────────────────────────────────────

/// Measurement type of an encoded field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Nominal,
    Ordinal,
    Quantitative,
    Temporal,
}

impl FieldType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::Nominal => "nominal",
            FieldType::Ordinal => "ordinal",
            FieldType::Quantitative => "quantitative",
            FieldType::Temporal => "temporal",
        }
    }

    /// Single-letter code used to mint synthetic field names (`q1`, `n2`, ...).
    pub fn code(&self) -> &'static str {
        match self {
            FieldType::Nominal => "n",
            FieldType::Ordinal => "o",
            FieldType::Quantitative => "q",
            FieldType::Temporal => "t",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for FieldType {
    type Err = UnknownEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "nominal" => Ok(FieldType::Nominal),
            "ordinal" => Ok(FieldType::Ordinal),
            "quantitative" => Ok(FieldType::Quantitative),
            "temporal" => Ok(FieldType::Temporal),
            other => Err(UnknownEnumError::new(Property::FieldType, other)),
        }
    }
}

// ─── Aggregate ───────────────────────────────────────────────────────────────

/// Aggregate function applied to an encoded field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Aggregate {
    Count,
    Max,
    Mean,
    Median,
    Min,
    Sum,
}

impl Aggregate {
    pub fn as_str(&self) -> &'static str {
        match self {
            Aggregate::Count => "count",
            Aggregate::Max => "max",
            Aggregate::Mean => "mean",
            Aggregate::Median => "median",
            Aggregate::Min => "min",
            Aggregate::Sum => "sum",
        }
    }
}

impl fmt::Display for Aggregate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Aggregate {
    type Err = UnknownEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "count" => Ok(Aggregate::Count),
            "max" => Ok(Aggregate::Max),
            "mean" => Ok(Aggregate::Mean),
            "median" => Ok(Aggregate::Median),
            "min" => Ok(Aggregate::Min),
            "sum" => Ok(Aggregate::Sum),
            other => Err(UnknownEnumError::new(Property::Aggregate, other)),
        }
    }
}

// ─── Bin ─────────────────────────────────────────────────────────────────────

/// Binning directive. The enum name is the bucket count in decimal
/// (`"10"` -> `{ "maxbins": 10 }`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BinDef {
    pub maxbins: u32,
}

impl BinDef {
    pub fn from_enum_name(name: &str) -> Result<Self, UnknownEnumError> {
        name.parse::<u32>()
            .map(|maxbins| BinDef { maxbins })
            .map_err(|_| UnknownEnumError::new(Property::Bin, name))
    }

    pub fn enum_name(&self) -> String {
        self.maxbins.to_string()
    }
}

// ─── Scale ───────────────────────────────────────────────────────────────────

/// Scale directive. Two shapes exist in the wild and both are preserved on
/// the wire: `"zero"` -> `{ "zero": true }` and `"log"` -> `{ "type": "log" }`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "ScaleDefRepr", try_from = "ScaleDefRepr")]
pub enum ScaleDef {
    Zero,
    Log,
}

impl ScaleDef {
    pub fn from_enum_name(name: &str) -> Result<Self, UnknownEnumError> {
        match name {
            "zero" => Ok(ScaleDef::Zero),
            "log" => Ok(ScaleDef::Log),
            other => Err(UnknownEnumError::new(Property::Scale, other)),
        }
    }

    pub fn enum_name(&self) -> &'static str {
        match self {
            ScaleDef::Zero => "zero",
            ScaleDef::Log => "log",
        }
    }
}

/// Wire shape of [`ScaleDef`].
#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum ScaleDefRepr {
    Zero {
        zero: bool,
    },
    Log {
        #[serde(rename = "type")]
        kind: String,
    },
}

impl From<ScaleDef> for ScaleDefRepr {
    fn from(value: ScaleDef) -> Self {
        match value {
            ScaleDef::Zero => ScaleDefRepr::Zero { zero: true },
            ScaleDef::Log => ScaleDefRepr::Log { kind: "log".to_string() },
        }
    }
}

impl TryFrom<ScaleDefRepr> for ScaleDef {
    type Error = String;

    fn try_from(repr: ScaleDefRepr) -> Result<Self, Self::Error> {
        match repr {
            ScaleDefRepr::Zero { zero: true } => Ok(ScaleDef::Zero),
            ScaleDefRepr::Zero { zero: false } => {
                Err("scale object '{\"zero\": false}' is not representable".to_string())
            }
            ScaleDefRepr::Log { kind } if kind == "log" => Ok(ScaleDef::Log),
            ScaleDefRepr::Log { kind } => Err(format!("unknown scale type '{kind}'")),
        }
    }
}

// ─── PropValue ───────────────────────────────────────────────────────────────

/// A typed property value, as produced by expanding an enum name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropValue {
    Mark(Mark),
    Channel(Channel),
    FieldType(FieldType),
    Aggregate(Aggregate),
    Bin(BinDef),
    Scale(ScaleDef),
}

impl PropValue {
    /// Expands an enum name into the typed value it stands for.
    pub fn build(property: Property, enum_name: &str) -> Result<Self, UnknownEnumError> {
        match property {
            Property::Mark => enum_name.parse().map(PropValue::Mark),
            Property::Channel => enum_name.parse().map(PropValue::Channel),
            Property::FieldType => enum_name.parse().map(PropValue::FieldType),
            Property::Aggregate => enum_name.parse().map(PropValue::Aggregate),
            Property::Bin => BinDef::from_enum_name(enum_name).map(PropValue::Bin),
            Property::Scale => ScaleDef::from_enum_name(enum_name).map(PropValue::Scale),
        }
    }

    /// Collapses the value back to the enum name that produced it.
    pub fn enum_name(&self) -> String {
        match self {
            PropValue::Mark(m) => m.as_str().to_string(),
            PropValue::Channel(c) => c.as_str().to_string(),
            PropValue::FieldType(t) => t.as_str().to_string(),
            PropValue::Aggregate(a) => a.as_str().to_string(),
            PropValue::Bin(b) => b.enum_name(),
            PropValue::Scale(s) => s.enum_name().to_string(),
        }
    }

    /// The property this value belongs to.
    pub fn property(&self) -> Property {
        match self {
            PropValue::Mark(_) => Property::Mark,
            PropValue::Channel(_) => Property::Channel,
            PropValue::FieldType(_) => Property::FieldType,
            PropValue::Aggregate(_) => Property::Aggregate,
            PropValue::Bin(_) => Property::Bin,
            PropValue::Scale(_) => Property::Scale,
        }
    }
}
