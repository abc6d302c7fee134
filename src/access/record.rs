//! Stored entity records used by the in-memory executors.

use crate::access::Value;
use crate::catalog::EntityRegistry;
use crate::search::DISCRIMINATOR;
use anyhow::{bail, Context, Result};
use std::collections::BTreeMap;

static NULL: Value = Value::Null;

/// One stored entity: its kind plus its column values
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    entity_kind: String,
    values: BTreeMap<String, Value>,
}

impl Record {
    pub fn new(entity_kind: impl Into<String>) -> Self {
        Self {
            entity_kind: entity_kind.into(),
            values: BTreeMap::new(),
        }
    }

    /// Builder-style setter
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.insert(field.into(), value.into());
        self
    }

    pub fn entity_kind(&self) -> &str {
        &self.entity_kind
    }

    /// Value of a column; unset columns read as NULL
    pub fn get(&self, field: &str) -> &Value {
        self.values.get(field).unwrap_or(&NULL)
    }

    /// Parse a record from a JSON object tagged with its entity kind.
    ///
    /// Every column, searchable or not, must be declared by the entity schema
    /// and carry a value of the declared type.
    pub fn from_json(json: &serde_json::Value, registry: &EntityRegistry) -> Result<Self> {
        let Some(object) = json.as_object() else {
            bail!("Record must be a JSON object, got {}", json);
        };

        let Some(kind) = object.get(DISCRIMINATOR).and_then(|t| t.as_str()) else {
            bail!("Record is missing a string '{}' field", DISCRIMINATOR);
        };

        let Some(schema) = registry.get(kind) else {
            bail!("Unknown entity kind: {}", kind);
        };

        let mut record = Record::new(kind);
        for (name, raw) in object {
            if name == DISCRIMINATOR {
                continue;
            }
            let Some(field) = schema.field(name) else {
                bail!("Entity {} has no field named {}", kind, name);
            };
            let Some(value) = Value::from_json(raw, field.data_type) else {
                bail!(
                    "Field {}.{} expects {}, got {}",
                    kind,
                    name,
                    field.data_type,
                    raw
                );
            };
            if value != Value::Null {
                record.values.insert(name.clone(), value);
            }
        }

        Ok(record)
    }

    /// Render as a JSON object tagged with the entity kind
    pub fn to_json(&self) -> serde_json::Value {
        let mut object = serde_json::Map::new();
        object.insert(
            DISCRIMINATOR.to_string(),
            serde_json::Value::String(self.entity_kind.clone()),
        );
        for (name, value) in &self.values {
            object.insert(name.clone(), value.to_json());
        }
        serde_json::Value::Object(object)
    }

    /// Parse a JSON array of records
    pub fn list_from_json(json: &serde_json::Value, registry: &EntityRegistry) -> Result<Vec<Self>> {
        let Some(items) = json.as_array() else {
            bail!("Expected a JSON array of records");
        };

        items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                Record::from_json(item, registry).with_context(|| format!("Invalid record #{}", i))
            })
            .collect()
    }
}
