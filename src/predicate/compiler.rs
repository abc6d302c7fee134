//! Compilation of typed search trees into predicates.

use crate::access::DataType;
use crate::catalog::{EntityRegistry, EntitySchema};
use crate::predicate::Predicate;
use crate::search::{EntityPredicate, ExpressionNode};
use log::debug;
use thiserror::Error;

/// Errors for trees that were not produced by the resolver against the same
/// registry
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CompileError {
    #[error("Unknown entity kind: {0}")]
    UnknownEntityKind(String),

    #[error("Entity {entity} has no searchable field {field}")]
    UnknownField { entity: String, field: String },

    #[error("Field {entity}.{field} expects {expected}, got {actual:?}")]
    ValueTypeMismatch {
        entity: String,
        field: String,
        expected: DataType,
        actual: Option<DataType>,
    },
}

/// Bottom-up transform from `ExpressionNode` to `Predicate`
pub struct PredicateCompiler<'a> {
    registry: &'a EntityRegistry,
}

impl<'a> PredicateCompiler<'a> {
    pub fn new(registry: &'a EntityRegistry) -> Self {
        Self { registry }
    }

    /// Compile a tree. Either the whole tree compiles or nothing is returned.
    pub fn compile(&self, node: &ExpressionNode) -> Result<Predicate, CompileError> {
        let predicate = self.compile_node(node)?;
        debug!("Compiled search tree into predicate: {}", predicate);
        Ok(predicate)
    }

    fn compile_node(&self, node: &ExpressionNode) -> Result<Predicate, CompileError> {
        match node {
            ExpressionNode::Not(child) => Ok(Predicate::negate(self.compile_node(child)?)),
            ExpressionNode::And(children) => Ok(Predicate::conjunction(
                self.compile_children(children)?,
            )),
            ExpressionNode::Or(children) => Ok(Predicate::disjunction(
                self.compile_children(children)?,
            )),
            ExpressionNode::Entity(entity) => self.compile_entity(entity),
        }
    }

    fn compile_children(&self, children: &[ExpressionNode]) -> Result<Vec<Predicate>, CompileError> {
        children.iter().map(|c| self.compile_node(c)).collect()
    }

    /// One equality test per set field, in schema field order
    fn compile_entity(&self, entity: &EntityPredicate) -> Result<Predicate, CompileError> {
        let kind = entity.entity_kind();
        let schema = self
            .registry
            .get(kind)
            .ok_or_else(|| CompileError::UnknownEntityKind(kind.to_string()))?;

        check_fields(schema, entity)?;

        let tests = schema
            .searchable_fields()
            .filter_map(|field| {
                entity
                    .get(&field.name)
                    .map(|value| Predicate::field_equals(kind, field.name.clone(), value.clone()))
            })
            .collect();

        Ok(Predicate::conjunction(tests))
    }
}

fn check_fields(schema: &EntitySchema, entity: &EntityPredicate) -> Result<(), CompileError> {
    for (name, value) in entity.fields() {
        let Some(field) = schema.searchable_field(name) else {
            return Err(CompileError::UnknownField {
                entity: schema.name.clone(),
                field: name.clone(),
            });
        };
        if !value.is_compatible_with(field.data_type) {
            return Err(CompileError::ValueTypeMismatch {
                entity: schema.name.clone(),
                field: name.clone(),
                expected: field.data_type,
                actual: value.data_type(),
            });
        }
    }
    Ok(())
}

/// Helper function to compile a tree against a registry
pub fn compile_tree(
    node: &ExpressionNode,
    registry: &EntityRegistry,
) -> Result<Predicate, CompileError> {
    PredicateCompiler::new(registry).compile(node)
}
