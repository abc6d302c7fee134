//! Resolution of untyped JSON payloads into typed search trees.

use crate::search::error::{NodePath, ResolveErrorKind, ResolveErrors, ResolveResult};
use crate::search::node::ExpressionNode;
use crate::search::variant::{Rejection, ValidatedNode, VariantCatalog};
use crate::search::DISCRIMINATOR;
use log::debug;

/// Knobs callers may set on resolution
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolverOptions {
    /// Maximum number of nested nodes on any root-to-leaf path.
    /// `None` leaves depth bounded only by payload size.
    pub max_depth: Option<usize>,
}

/// Resolver that turns payload nodes into typed nodes by trying catalog
/// variants in order
pub struct NodeResolver<'a> {
    catalog: &'a VariantCatalog,
    options: ResolverOptions,
}

impl<'a> NodeResolver<'a> {
    pub fn new(catalog: &'a VariantCatalog) -> Self {
        Self::with_options(catalog, ResolverOptions::default())
    }

    pub fn with_options(catalog: &'a VariantCatalog, options: ResolverOptions) -> Self {
        Self { catalog, options }
    }

    /// Resolve a whole payload tree
    pub fn resolve(&self, payload: &serde_json::Value) -> ResolveResult<ExpressionNode> {
        let node = self.resolve_node(payload, &NodePath::root(), 1)?;
        debug!("Resolved search tree rooted at {} node", node.tag());
        Ok(node)
    }

    fn resolve_node(
        &self,
        payload: &serde_json::Value,
        path: &NodePath,
        depth: usize,
    ) -> ResolveResult<ExpressionNode> {
        if let Some(limit) = self.options.max_depth {
            if depth > limit {
                return Err(ResolveErrors::single(
                    path.clone(),
                    ResolveErrorKind::DepthLimitExceeded { limit },
                ));
            }
        }

        let Some(node) = payload.as_object() else {
            return Err(ResolveErrors::single(
                path.clone(),
                ResolveErrorKind::NotAnObject {
                    received: payload.clone(),
                },
            ));
        };

        let seen = match node.get(DISCRIMINATOR) {
            None | Some(serde_json::Value::Null) => {
                return Err(ResolveErrors::single(
                    path.clone(),
                    ResolveErrorKind::MissingDiscriminator,
                ));
            }
            Some(serde_json::Value::String(tag)) => tag,
            Some(other) => {
                return Err(ResolveErrors::single(
                    path.field(DISCRIMINATOR),
                    ResolveErrorKind::FieldTypeMismatch {
                        expected: "string".to_string(),
                        received: other.clone(),
                    },
                ));
            }
        };

        let mut attempted = Vec::new();
        for variant in self.catalog.variants() {
            match variant.validate(node, path) {
                Ok(validated) => return self.build(validated, path, depth),
                Err(Rejection::TagMismatch) => attempted.push(variant.tag().to_string()),
                // Tags are unique, so no later variant can accept this node
                Err(Rejection::Invalid(errors)) => {
                    debug!(
                        "Payload at {} rejected by {} variant with {} error(s)",
                        path,
                        variant.tag(),
                        errors.len()
                    );
                    return Err(ResolveErrors::new(errors));
                }
            }
        }

        Err(ResolveErrors::single(
            path.clone(),
            ResolveErrorKind::NoMatchingVariant {
                seen: seen.clone(),
                attempted,
            },
        ))
    }

    fn build(
        &self,
        validated: ValidatedNode<'_>,
        path: &NodePath,
        depth: usize,
    ) -> ResolveResult<ExpressionNode> {
        match validated {
            ValidatedNode::Not { child } => {
                let child = self.resolve_node(child, &path.field("child"), depth + 1)?;
                Ok(ExpressionNode::not(child))
            }
            ValidatedNode::Or { children } => Ok(ExpressionNode::or(
                self.resolve_children(children, path, depth)?,
            )),
            ValidatedNode::And { children } => Ok(ExpressionNode::and(
                self.resolve_children(children, path, depth)?,
            )),
            ValidatedNode::Entity(entity) => Ok(ExpressionNode::entity(entity)),
        }
    }

    /// Resolve children in order, stopping at the first failure
    fn resolve_children(
        &self,
        children: &[serde_json::Value],
        path: &NodePath,
        depth: usize,
    ) -> ResolveResult<Vec<ExpressionNode>> {
        let list_path = path.field("children");
        children
            .iter()
            .enumerate()
            .map(|(i, child)| self.resolve_node(child, &list_path.index(i), depth + 1))
            .collect()
    }
}

/// Helper function to resolve a payload with default options
pub fn resolve_payload(
    payload: &serde_json::Value,
    catalog: &VariantCatalog,
) -> ResolveResult<ExpressionNode> {
    NodeResolver::new(catalog).resolve(payload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::EntityRegistry;
    use crate::search::node::EntityPredicate;
    use serde_json::json;

    fn catalog() -> VariantCatalog {
        VariantCatalog::new(&EntityRegistry::builtin()).unwrap()
    }

    fn user() -> EntityPredicate {
        EntityPredicate::new("User")
    }

    #[test]
    fn test_resolve_entity() {
        let catalog = catalog();
        let node = resolve_payload(
            &json!({"type": "User", "first_name": "John", "last_name": "Doe"}),
            &catalog,
        )
        .unwrap();

        assert_eq!(
            node,
            ExpressionNode::entity(user().with("first_name", "John").with("last_name", "Doe"))
        );
    }

    #[test]
    fn test_resolve_nested() {
        let catalog = catalog();
        let node = resolve_payload(
            &json!({
                "type": "And",
                "children": [
                    {"type": "User", "company_id": 1000000042},
                    {"type": "Or", "children": [
                        {"type": "Not", "child": {"type": "User", "first_name": "John"}},
                        {"type": "Company", "name": "Acme"}
                    ]}
                ]
            }),
            &catalog,
        )
        .unwrap();

        assert_eq!(
            node,
            ExpressionNode::and(vec![
                ExpressionNode::entity(user().with("company_id", 1000000042)),
                ExpressionNode::or(vec![
                    ExpressionNode::not(ExpressionNode::entity(user().with("first_name", "John"))),
                    ExpressionNode::entity(EntityPredicate::new("Company").with("name", "Acme")),
                ]),
            ])
        );
    }

    #[test]
    fn test_non_object_payload() {
        let catalog = catalog();
        let errors = resolve_payload(&json!(["User"]), &catalog).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.errors()[0].kind.code(), "NotAnObject");
        assert!(errors.errors()[0].path.is_root());
    }

    #[test]
    fn test_missing_discriminator() {
        let catalog = catalog();
        for payload in [json!({"first_name": "John"}), json!({"type": null})] {
            let errors = resolve_payload(&payload, &catalog).unwrap_err();
            assert_eq!(errors.errors()[0].kind, ResolveErrorKind::MissingDiscriminator);
        }
    }

    #[test]
    fn test_non_string_discriminator() {
        let catalog = catalog();
        let errors = resolve_payload(&json!({"type": 7}), &catalog).unwrap_err();
        assert_eq!(errors.errors()[0].path.to_string(), "type");
        assert_eq!(errors.errors()[0].kind.code(), "FieldTypeMismatch");
    }

    #[test]
    fn test_unknown_tag_lists_attempts() {
        let catalog = catalog();
        let errors =
            resolve_payload(&json!({"type": "InvalidSearchModel"}), &catalog).unwrap_err();

        assert_eq!(
            errors.errors()[0].kind,
            ResolveErrorKind::NoMatchingVariant {
                seen: "InvalidSearchModel".to_string(),
                attempted: vec![
                    "Not".to_string(),
                    "Or".to_string(),
                    "And".to_string(),
                    "User".to_string(),
                    "Company".to_string(),
                ],
            }
        );
    }

    #[test]
    fn test_tag_is_case_sensitive() {
        let catalog = catalog();
        let errors = resolve_payload(&json!({"type": "user"}), &catalog).unwrap_err();
        assert_eq!(errors.errors()[0].kind.code(), "NoMatchingVariant");
    }

    #[test]
    fn test_child_error_carries_path() {
        let catalog = catalog();
        let errors = resolve_payload(
            &json!({
                "type": "Or",
                "children": [
                    {"type": "User", "last_name": "Doe"},
                    {"type": "Not", "child": {"type": "User", "company_id": "42"}}
                ]
            }),
            &catalog,
        )
        .unwrap_err();

        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors.errors()[0].path.to_string(),
            "children[1].child.company_id"
        );
    }

    #[test]
    fn test_first_failing_child_short_circuits() {
        let catalog = catalog();
        let errors = resolve_payload(
            &json!({
                "type": "And",
                "children": [
                    {"type": "User"},
                    {"type": "Robot"},
                    {"type": "User", "bogus": 1}
                ]
            }),
            &catalog,
        )
        .unwrap_err();

        assert_eq!(errors.len(), 1);
        assert_eq!(errors.errors()[0].path.to_string(), "children[1]");
        assert_eq!(errors.errors()[0].kind.code(), "NoMatchingVariant");
    }

    #[test]
    fn test_depth_limit() {
        let catalog = catalog();
        let payload = json!({"type": "Not", "child": {"type": "Not", "child": {"type": "User"}}});

        let resolver = NodeResolver::with_options(
            &catalog,
            ResolverOptions {
                max_depth: Some(3),
            },
        );
        assert!(resolver.resolve(&payload).is_ok());

        let resolver = NodeResolver::with_options(
            &catalog,
            ResolverOptions {
                max_depth: Some(2),
            },
        );
        let errors = resolver.resolve(&payload).unwrap_err();
        assert_eq!(
            errors.errors()[0].kind,
            ResolveErrorKind::DepthLimitExceeded { limit: 2 }
        );
        assert_eq!(errors.errors()[0].path.to_string(), "child.child");
    }

    #[test]
    fn test_payload_is_not_mutated() {
        let catalog = catalog();
        let payload = json!({"type": "User", "first_name": "John", "email": null});
        let before = payload.clone();
        let _ = resolve_payload(&payload, &catalog);
        assert_eq!(payload, before);
    }
}
