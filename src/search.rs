//! Search expression trees and their resolution from JSON payloads.
//!
//! A search payload is a nested JSON object. Every node carries a `type`
//! discriminator naming either a boolean operator (`Not`, `Or`, `And`) or an
//! entity kind from the registry. Resolution turns the payload into an
//! `ExpressionNode` tree; compilation then turns the tree into a `Predicate`.

pub mod error;
pub mod node;
pub mod resolver;
pub mod variant;

pub use error::{NodePath, PathSegment, ResolveError, ResolveErrorKind, ResolveErrors, ResolveResult};
pub use node::{EntityPredicate, ExpressionNode};
pub use resolver::{resolve_payload, NodeResolver, ResolverOptions};
pub use variant::{FieldShape, Variant, VariantCatalog, VariantField, VariantKind};

use crate::catalog::{CatalogError, EntityRegistry};
use crate::predicate::{CompileError, Predicate, PredicateCompiler};
use log::info;
use serde_json::json;
use thiserror::Error;

/// Payload key holding a node's variant tag
pub const DISCRIMINATOR: &str = "type";

/// Errors from the payload-to-predicate pipeline
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SearchError {
    #[error(transparent)]
    Resolve(#[from] ResolveErrors),

    #[error("Compile error: {0}")]
    Compile(#[from] CompileError),
}

impl SearchError {
    /// Structured form for callers that report errors as JSON
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            SearchError::Resolve(errors) => json!({ "resolve_errors": errors.to_json() }),
            SearchError::Compile(err) => json!({ "compile_error": err.to_string() }),
        }
    }
}

/// Registry plus the variant catalog built from it.
///
/// Immutable after construction; share it by reference across threads.
#[derive(Debug)]
pub struct SearchCompiler {
    registry: EntityRegistry,
    catalog: VariantCatalog,
    options: ResolverOptions,
}

impl SearchCompiler {
    pub fn new(registry: EntityRegistry) -> Result<Self, CatalogError> {
        let catalog = VariantCatalog::new(&registry)?;
        info!(
            "Search compiler ready with {} variants: {}",
            catalog.variants().len(),
            catalog.tags().join(", ")
        );
        Ok(Self {
            registry,
            catalog,
            options: ResolverOptions::default(),
        })
    }

    pub fn with_options(mut self, options: ResolverOptions) -> Self {
        self.options = options;
        self
    }

    pub fn registry(&self) -> &EntityRegistry {
        &self.registry
    }

    pub fn catalog(&self) -> &VariantCatalog {
        &self.catalog
    }

    /// Resolve a payload into a typed tree
    pub fn resolve(&self, payload: &serde_json::Value) -> ResolveResult<ExpressionNode> {
        NodeResolver::with_options(&self.catalog, self.options.clone()).resolve(payload)
    }

    /// Compile an already resolved tree
    pub fn compile_node(&self, node: &ExpressionNode) -> Result<Predicate, CompileError> {
        PredicateCompiler::new(&self.registry).compile(node)
    }

    /// Resolve and compile a payload
    pub fn compile(&self, payload: &serde_json::Value) -> Result<Predicate, SearchError> {
        let node = self.resolve(payload)?;
        Ok(self.compile_node(&node)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compiler() -> SearchCompiler {
        SearchCompiler::new(EntityRegistry::builtin()).unwrap()
    }

    #[test]
    fn test_compile_payload() {
        let predicate = compiler()
            .compile(&json!({"type": "User", "first_name": "John", "last_name": "Doe"}))
            .unwrap();
        assert_eq!(
            predicate,
            Predicate::and(vec![
                Predicate::field_equals("User", "first_name", "John"),
                Predicate::field_equals("User", "last_name", "Doe"),
            ])
        );
    }

    #[test]
    fn test_resolve_error_passes_through() {
        let err = compiler()
            .compile(&json!({"type": "User", "hashed_password": "x"}))
            .unwrap_err();

        let SearchError::Resolve(errors) = &err else {
            panic!("expected a resolve error, got {:?}", err);
        };
        assert_eq!(errors.errors()[0].kind.code(), "UnknownField");
        assert_eq!(err.to_json()["resolve_errors"][0]["path"], json!("hashed_password"));
    }

    #[test]
    fn test_options_apply() {
        let compiler = compiler().with_options(ResolverOptions { max_depth: Some(1) });
        assert!(compiler.compile(&json!({"type": "User"})).is_ok());
        let err = compiler
            .compile(&json!({"type": "Not", "child": {"type": "User"}}))
            .unwrap_err();
        assert!(matches!(err, SearchError::Resolve(_)));
    }

    #[test]
    fn test_compile_error_to_json() {
        let err = SearchError::from(CompileError::UnknownEntityKind("Robot".to_string()));
        assert_eq!(
            err.to_json(),
            json!({"compile_error": "Unknown entity kind: Robot"})
        );
    }
}
