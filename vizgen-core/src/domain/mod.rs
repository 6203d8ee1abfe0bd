//! Domain types for chart specifications

pub mod property;
pub mod spec;
pub mod value;

pub use property::{ParsePropertyError, Property};
pub use spec::{Encoding, Spec};
pub use value::{Aggregate, BinDef, Channel, FieldType, Mark, PropValue, ScaleDef, UnknownEnumError};
