// /record.rs
use crate::error::Result;
use crate::schema::FieldSchema;

use serde::ser::{Serialize, Serializer};
use serde_json::Value;

/// Flat snapshot of a character sheet: one string per schema field, in
/// schema order.
///
/// A record always holds exactly the schema's fields. Loading tolerates
/// missing keys (they become empty) and drops unknown keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharacterRecord {
    fields: Vec<(&'static str, String)>,
}

impl CharacterRecord {
    pub fn empty(schema: &FieldSchema) -> Self {
        Self {
            fields: schema
                .fields()
                .iter()
                .map(|field| (*field, String::new()))
                .collect(),
        }
    }

    // Builds a record from a stored JSON value. Anything but an object yields an empty record.
    pub fn from_value(schema: &FieldSchema, value: &Value) -> Self {
        let mut record = Self::empty(schema);
        if let Value::Object(map) = value {
            for (field, slot) in record.fields.iter_mut() {
                *slot = map.get(*field).map(stored_text).unwrap_or_default();
            }
        }
        record
    }

    pub fn from_json(schema: &FieldSchema, raw: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(raw)?;
        Ok(Self::from_value(schema, &value))
    }

    pub fn to_value(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    // Value of `field`, or "" when the field is not part of the record.
    pub fn get(&self, field: &str) -> &str {
        self.fields
            .iter()
            .find(|(id, _)| *id == field)
            .map(|(_, value)| value.as_str())
            .unwrap_or("")
    }

    /// Sets `field` to `value`. Returns false, leaving the record untouched,
    /// when the field is outside the schema.
    pub fn set(&mut self, field: &str, value: impl Into<String>) -> bool {
        match self.fields.iter_mut().find(|(id, _)| *id == field) {
            Some((_, slot)) => {
                *slot = value.into();
                true
            }
            None => false,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> + '_ {
        self.fields.iter().map(|(id, value)| (*id, value.as_str()))
    }

    pub fn is_blank(&self) -> bool {
        self.fields.iter().all(|(_, value)| value.is_empty())
    }
}

impl Serialize for CharacterRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_map(self.fields.iter().map(|(id, value)| (*id, value)))
    }
}

// Scalars keep their textual form; null and containers read as empty.
fn stored_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Number(number) => number.to_string(),
        Value::Bool(flag) => flag.to_string(),
        Value::Null | Value::Array(_) | Value::Object(_) => String::new(),
    }
}
