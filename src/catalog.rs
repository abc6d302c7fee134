//! Entity schema registry.
//!
//! The registry is the static list of entity kinds a search may target, each
//! with its ordered fields. It is built once at startup, validated, and then
//! shared read-only by every resolver and compiler.

pub mod entity_schema;

pub use entity_schema::{EntitySchema, FieldInfo};

use crate::access::DataType;
use crate::search::DISCRIMINATOR;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;
use thiserror::Error;

/// Configuration errors detected while building the registry or variant catalog
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Entity kind name must not be empty")]
    EmptyEntityName,

    #[error("Entity kind {0} is registered more than once")]
    DuplicateEntity(String),

    #[error("Entity {entity} declares field {field} more than once")]
    DuplicateField { entity: String, field: String },

    #[error("Entity {entity} declares reserved field name {field}")]
    ReservedField { entity: String, field: String },

    #[error("Variant tag {0} is used by more than one search node variant")]
    DuplicateVariantTag(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid registry JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Deserialize)]
struct RegistryFile {
    entities: Vec<EntitySchema>,
}

/// Ordered, validated set of entity schemas
#[derive(Debug, Clone, PartialEq)]
pub struct EntityRegistry {
    entities: Vec<EntitySchema>,
}

impl EntityRegistry {
    /// Build a registry, rejecting duplicate kinds and malformed field lists
    pub fn new(entities: Vec<EntitySchema>) -> Result<Self, CatalogError> {
        let mut kinds = HashSet::new();

        for entity in &entities {
            if entity.name.is_empty() {
                return Err(CatalogError::EmptyEntityName);
            }
            if !kinds.insert(entity.name.as_str()) {
                return Err(CatalogError::DuplicateEntity(entity.name.clone()));
            }

            let mut names = HashSet::new();
            for field in &entity.fields {
                if field.name == DISCRIMINATOR {
                    return Err(CatalogError::ReservedField {
                        entity: entity.name.clone(),
                        field: field.name.clone(),
                    });
                }
                if !names.insert(field.name.as_str()) {
                    return Err(CatalogError::DuplicateField {
                        entity: entity.name.clone(),
                        field: field.name.clone(),
                    });
                }
            }
        }

        Ok(Self { entities })
    }

    /// Parse a registry from `{"entities": [{"name": ..., "fields": [...]}]}`
    pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
        let file: RegistryFile = serde_json::from_str(json)?;
        Self::new(file.entities)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// The `User` and `Company` entities the search API ships with
    pub fn builtin() -> Self {
        Self {
            entities: vec![
                EntitySchema::new(
                    "User",
                    vec![
                        FieldInfo::new("id", DataType::Int64),
                        FieldInfo::new("first_name", DataType::Varchar),
                        FieldInfo::new("last_name", DataType::Varchar),
                        FieldInfo::new("email", DataType::Varchar),
                        FieldInfo::new("company_id", DataType::Int64),
                        FieldInfo::hidden("hashed_password", DataType::Varchar),
                    ],
                ),
                EntitySchema::new(
                    "Company",
                    vec![
                        FieldInfo::new("id", DataType::Int64),
                        FieldInfo::new("name", DataType::Varchar),
                        FieldInfo::hidden("address", DataType::Varchar),
                    ],
                ),
            ],
        }
    }

    pub fn get(&self, kind: &str) -> Option<&EntitySchema> {
        self.entities.iter().find(|e| e.name == kind)
    }

    /// Entity schemas in registration order
    pub fn entities(&self) -> &[EntitySchema] {
        &self.entities
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

impl Default for EntityRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_builtin_registry() {
        let registry = EntityRegistry::builtin();
        assert_eq!(registry.len(), 2);

        let kinds: Vec<&str> = registry.entities().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(kinds, vec!["User", "Company"]);

        let user = registry.get("User").unwrap();
        assert!(user.searchable_field("company_id").is_some());
        assert!(user.searchable_field("hashed_password").is_none());
        assert!(registry.get("Robot").is_none());
    }

    #[test]
    fn test_builtin_registry_is_valid() {
        let builtin = EntityRegistry::builtin();
        let rebuilt = EntityRegistry::new(builtin.entities().to_vec()).unwrap();
        assert_eq!(rebuilt, builtin);
    }

    #[test]
    fn test_duplicate_entity_rejected() {
        let result = EntityRegistry::new(vec![
            EntitySchema::new("User", vec![]),
            EntitySchema::new("User", vec![]),
        ]);
        assert!(matches!(result, Err(CatalogError::DuplicateEntity(name)) if name == "User"));
    }

    #[test]
    fn test_duplicate_field_rejected() {
        let result = EntityRegistry::new(vec![EntitySchema::new(
            "User",
            vec![
                FieldInfo::new("id", DataType::Int64),
                FieldInfo::new("id", DataType::Varchar),
            ],
        )]);
        assert!(matches!(result, Err(CatalogError::DuplicateField { .. })));
    }

    #[test]
    fn test_reserved_field_rejected() {
        let result = EntityRegistry::new(vec![EntitySchema::new(
            "User",
            vec![FieldInfo::new("type", DataType::Varchar)],
        )]);
        assert!(matches!(result, Err(CatalogError::ReservedField { .. })));
    }

    #[test]
    fn test_empty_entity_name_rejected() {
        let result = EntityRegistry::new(vec![EntitySchema::new("", vec![])]);
        assert!(matches!(result, Err(CatalogError::EmptyEntityName)));
    }

    #[test]
    fn test_registry_from_json_file() -> anyhow::Result<()> {
        let mut file = NamedTempFile::new()?;
        write!(
            file,
            r#"{{
                "entities": [
                    {{"name": "Book", "fields": [
                        {{"name": "isbn", "type": "varchar"}},
                        {{"name": "pages", "type": "int64"}},
                        {{"name": "price", "type": "float64"}},
                        {{"name": "in_print", "type": "boolean"}},
                        {{"name": "secret", "type": "varchar", "searchable": false}}
                    ]}}
                ]
            }}"#
        )?;

        let registry = EntityRegistry::from_json_file(file.path())?;
        let book = registry.get("Book").unwrap();
        assert_eq!(book.fields.len(), 5);
        assert_eq!(book.searchable_fields().count(), 4);
        assert_eq!(book.field("price").unwrap().data_type, DataType::Float64);
        Ok(())
    }

    #[test]
    fn test_registry_from_bad_json() {
        assert!(matches!(
            EntityRegistry::from_json_str("{\"entities\": 3}"),
            Err(CatalogError::Json(_))
        ));
        assert!(matches!(
            EntityRegistry::from_json_file("/nonexistent/registry.json"),
            Err(CatalogError::Io(_))
        ));
    }
}
