//! Chart specification and per-channel encodings.
//!
//! A [`Spec`] is the unit the whole pipeline passes around: generation fills
//! it, mutation rewrites one property at a time, improvement passes patch it
//! up, and the runner serializes accepted ones. The encoding map is keyed by
//! [`Channel`] so iteration order is canonical and a channel can never carry
//! two encodings.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::value::{Aggregate, BinDef, Channel, FieldType, Mark, PropValue, ScaleDef};

/// One visual encoding: the description of what a single channel shows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Encoding {
    /// Measurement type, spelled `"type"` on the wire.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub field_type: Option<FieldType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aggregate: Option<Aggregate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bin: Option<BinDef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<ScaleDef>,
}

impl Encoding {
    /// Writes an encoding-level value onto this encoding, overwriting any
    /// previous value for the same property. Returns false when the value
    /// does not belong on an encoding (marks and channels never do).
    pub fn set(&mut self, value: PropValue) -> bool {
        match value {
            PropValue::FieldType(t) => self.field_type = Some(t),
            PropValue::Aggregate(a) => self.aggregate = Some(a),
            PropValue::Bin(b) => self.bin = Some(b),
            PropValue::Scale(s) => self.scale = Some(s),
            PropValue::Mark(_) | PropValue::Channel(_) => return false,
        }
        true
    }

    /// Reads the enum name currently held for an encoding-level property.
    pub fn enum_name_of(&self, property: crate::domain::Property) -> Option<String> {
        use crate::domain::Property;
        match property {
            Property::FieldType => self.field_type.map(|t| t.as_str().to_string()),
            Property::Aggregate => self.aggregate.map(|a| a.as_str().to_string()),
            Property::Bin => self.bin.map(|b| b.enum_name()),
            Property::Scale => self.scale.map(|s| s.enum_name().to_string()),
            Property::Mark | Property::Channel => None,
        }
    }
}

/// A chart specification.
///
/// Top-level properties live as typed fields; everything channel-bound lives
/// in `encoding`. Absent options are omitted from JSON, so an empty spec
/// serializes as `{"encoding": {}}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Spec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mark: Option<Mark>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<ScaleDef>,
    #[serde(default)]
    pub encoding: BTreeMap<Channel, Encoding>,
}

impl Spec {
    /// Writes a top-level value onto the spec, overwriting any previous
    /// value. Returns false when the value does not correspond to a
    /// top-level property (only `mark` and `scale` do).
    pub fn set_top_level(&mut self, value: PropValue) -> bool {
        match value {
            PropValue::Mark(m) => self.mark = Some(m),
            PropValue::Scale(s) => self.scale = Some(s),
            _ => return false,
        }
        true
    }

    /// Reads the enum name currently held for a top-level property.
    pub fn top_level_enum_name(&self, property: crate::domain::Property) -> Option<String> {
        use crate::domain::Property;
        match property {
            Property::Mark => self.mark.map(|m| m.as_str().to_string()),
            Property::Scale => self.scale.map(|s| s.enum_name().to_string()),
            _ => None,
        }
    }

    /// The encoding bound to a channel, if any.
    pub fn encoding_at(&self, channel: Channel) -> Option<&Encoding> {
        self.encoding.get(&channel)
    }

    /// Channels currently carrying an encoding, in canonical order.
    pub fn used_channels(&self) -> Vec<Channel> {
        self.encoding.keys().copied().collect()
    }
}
