//! Data schemas: the fields a dataset offers.
//!
//! Generated specs reference fields by name; a [`DataSchema`] is the ground
//! truth an oracle checks those references against. Field order is preserved
//! from the source document.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::domain::FieldType;

/// Errors from loading a schema document.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse schema JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

/// One dataset column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
}

impl Field {
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self { name: name.into(), field_type }
    }
}

/// Outcome of a schema sanity check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaValidation {
    pub is_valid: bool,
    pub errors: Vec<String>,
}

/// Ordered collection of dataset fields. Serializes as the bare field array.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DataSchema {
    fields: Vec<Field>,
}

impl DataSchema {
    pub fn new(fields: Vec<Field>) -> Self {
        Self { fields }
    }

    /// Parses `[{"name": "q1", "type": "quantitative"}, ...]`.
    pub fn from_json_str(json: &str) -> Result<Self, SchemaError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: &Path) -> Result<Self, SchemaError> {
        let json = fs::read_to_string(path).map_err(|source| SchemaError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// Synthetic schema with `per_type` fields of each measurement type,
    /// named the way the generator mints field names (`n1`, `o1`, `q1`,
    /// `t1`, `n2`, ...). Specs produced against the default pipeline always
    /// resolve against this schema.
    pub fn synthetic(per_type: usize) -> Self {
        let types = [
            FieldType::Nominal,
            FieldType::Ordinal,
            FieldType::Quantitative,
            FieldType::Temporal,
        ];
        let mut fields = Vec::with_capacity(types.len() * per_type);
        for field_type in types {
            for index in 1..=per_type {
                fields.push(Field::new(format!("{}{index}", field_type.code()), field_type));
            }
        }
        Self { fields }
    }

    /// Flags duplicate and empty field names.
    pub fn validate(&self) -> SchemaValidation {
        let mut errors = Vec::new();
        for (index, field) in self.fields.iter().enumerate() {
            if field.name.is_empty() {
                errors.push(format!("field {index} has an empty name"));
            }
        }
        for (index, field) in self.fields.iter().enumerate() {
            let first = self.fields.iter().position(|f| f.name == field.name);
            if first != Some(index) {
                errors.push(format!("duplicate field name '{}'", field.name));
            }
        }
        SchemaValidation { is_valid: errors.is_empty(), errors }
    }

    pub fn get(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn synthetic_schema_mints_generator_style_names() {
        let schema = DataSchema::synthetic(2);
        assert_eq!(schema.len(), 8);
        for name in ["n1", "n2", "o1", "o2", "q1", "q2", "t1", "t2"] {
            assert!(schema.contains(name), "synthetic schema misses '{name}'");
        }
        assert_eq!(
            schema.get("q1").map(|f| f.field_type),
            Some(FieldType::Quantitative)
        );
        assert_eq!(
            schema.get("t2").map(|f| f.field_type),
            Some(FieldType::Temporal)
        );
    }

    #[test]
    fn validate_accepts_clean_schemas() {
        let schema = DataSchema::synthetic(1);
        let validation = schema.validate();
        assert!(validation.is_valid);
        assert!(validation.errors.is_empty());
    }

    #[test]
    fn validate_flags_duplicates_and_empty_names() {
        let schema = DataSchema::new(vec![
            Field::new("price", FieldType::Quantitative),
            Field::new("", FieldType::Nominal),
            Field::new("price", FieldType::Temporal),
        ]);

        let validation = schema.validate();
        assert!(!validation.is_valid);
        assert_eq!(validation.errors.len(), 2);
        assert!(validation.errors[0].contains("empty name"));
        assert!(validation.errors[1].contains("duplicate field name 'price'"));
    }

    #[test]
    fn json_round_trip_preserves_field_order() {
        let schema = DataSchema::from_json_str(
            r#"[
                { "name": "price", "type": "quantitative" },
                { "name": "region", "type": "nominal" },
                { "name": "day", "type": "temporal" }
            ]"#,
        )
        .unwrap();

        assert_eq!(
            schema.fields().iter().map(|f| f.name.as_str()).collect::<Vec<_>>(),
            vec!["price", "region", "day"]
        );

        let json = serde_json::to_string(&schema).unwrap();
        let back = DataSchema::from_json_str(&json).unwrap();
        assert_eq!(back, schema);
    }

    #[test]
    fn empty_schema_is_vacuously_valid() {
        let schema = DataSchema::default();
        assert!(schema.is_empty());
        assert!(schema.validate().is_valid);
    }
}
