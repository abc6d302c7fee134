//! Entity schema and field metadata structures.

use crate::access::DataType;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldInfo {
    pub name: String,
    #[serde(rename = "type")]
    pub data_type: DataType,
    /// Whether clients may filter on this field
    #[serde(default = "default_searchable")]
    pub searchable: bool,
}

fn default_searchable() -> bool {
    true
}

impl FieldInfo {
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
            searchable: true,
        }
    }

    /// A stored field that is never exposed to search payloads
    pub fn hidden(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            searchable: false,
            ..Self::new(name, data_type)
        }
    }
}

/// One entity kind with its fields in declaration order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitySchema {
    pub name: String,
    pub fields: Vec<FieldInfo>,
}

impl EntitySchema {
    pub fn new(name: impl Into<String>, fields: Vec<FieldInfo>) -> Self {
        Self {
            name: name.into(),
            fields,
        }
    }

    /// Look up any declared field, searchable or not
    pub fn field(&self, name: &str) -> Option<&FieldInfo> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Look up a field that search payloads may reference
    pub fn searchable_field(&self, name: &str) -> Option<&FieldInfo> {
        self.field(name).filter(|f| f.searchable)
    }

    /// Searchable fields in declaration order
    pub fn searchable_fields(&self) -> impl Iterator<Item = &FieldInfo> {
        self.fields.iter().filter(|f| f.searchable)
    }
}
