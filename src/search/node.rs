//! Typed search expression tree.

use crate::access::Value;
use crate::search::DISCRIMINATOR;
use serde_json::{json, Map};
use std::collections::BTreeMap;

/// Equality constraints on one entity kind.
///
/// Only set fields are stored; assigning NULL leaves a field unset.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityPredicate {
    entity_kind: String,
    fields: BTreeMap<String, Value>,
}

impl EntityPredicate {
    pub fn new(entity_kind: impl Into<String>) -> Self {
        Self {
            entity_kind: entity_kind.into(),
            fields: BTreeMap::new(),
        }
    }

    /// Builder-style setter
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(field, value);
        self
    }

    pub(crate) fn set(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        let field = field.into();
        match value.into() {
            Value::Null => {
                self.fields.remove(&field);
            }
            value => {
                self.fields.insert(field, value);
            }
        }
    }

    pub fn entity_kind(&self) -> &str {
        &self.entity_kind
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Set fields, keyed by name
    pub fn fields(&self) -> &BTreeMap<String, Value> {
        &self.fields
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Search expression tree node
#[derive(Debug, Clone, PartialEq)]
pub enum ExpressionNode {
    /// Negation of exactly one child
    Not(Box<ExpressionNode>),

    /// Conjunction; children keep payload order
    And(Vec<ExpressionNode>),

    /// Disjunction; children keep payload order
    Or(Vec<ExpressionNode>),

    /// Field equality constraints on one entity kind
    Entity(EntityPredicate),
}

impl ExpressionNode {
    pub fn not(child: ExpressionNode) -> Self {
        ExpressionNode::Not(Box::new(child))
    }

    pub fn and(children: Vec<ExpressionNode>) -> Self {
        ExpressionNode::And(children)
    }

    pub fn or(children: Vec<ExpressionNode>) -> Self {
        ExpressionNode::Or(children)
    }

    pub fn entity(predicate: EntityPredicate) -> Self {
        ExpressionNode::Entity(predicate)
    }

    /// Discriminator tag this node was (or would be) submitted with
    pub fn tag(&self) -> &str {
        match self {
            ExpressionNode::Not(_) => "Not",
            ExpressionNode::And(_) => "And",
            ExpressionNode::Or(_) => "Or",
            ExpressionNode::Entity(entity) => entity.entity_kind(),
        }
    }

    /// Render the tree back into the payload shape it was resolved from.
    ///
    /// Only set fields are emitted, so a payload without explicit nulls
    /// round-trips unchanged.
    pub fn to_payload(&self) -> serde_json::Value {
        match self {
            ExpressionNode::Not(child) => json!({
                DISCRIMINATOR: "Not",
                "child": child.to_payload(),
            }),
            ExpressionNode::And(children) | ExpressionNode::Or(children) => json!({
                DISCRIMINATOR: self.tag(),
                "children": children.iter().map(|c| c.to_payload()).collect::<Vec<_>>(),
            }),
            ExpressionNode::Entity(entity) => {
                let mut object = Map::new();
                object.insert(DISCRIMINATOR.to_string(), json!(entity.entity_kind()));
                for (name, value) in entity.fields() {
                    object.insert(name.clone(), value.to_json());
                }
                serde_json::Value::Object(object)
            }
        }
    }

    /// Entity kind the search targets: the first entity predicate found
    /// depth-first, left to right. `None` if the tree has no entity predicate.
    pub fn entity_kind(&self) -> Option<&str> {
        match self {
            ExpressionNode::Entity(entity) => Some(entity.entity_kind()),
            ExpressionNode::Not(child) => child.entity_kind(),
            ExpressionNode::And(children) | ExpressionNode::Or(children) => {
                children.iter().find_map(|c| c.entity_kind())
            }
        }
    }

    /// All entity predicates in depth-first pre-order
    pub fn entity_predicates(&self) -> Vec<&EntityPredicate> {
        let mut out = Vec::new();
        self.collect_entities(&mut out);
        out
    }

    fn collect_entities<'a>(&'a self, out: &mut Vec<&'a EntityPredicate>) {
        match self {
            ExpressionNode::Entity(entity) => out.push(entity),
            ExpressionNode::Not(child) => child.collect_entities(out),
            ExpressionNode::And(children) | ExpressionNode::Or(children) => {
                for child in children {
                    child.collect_entities(out);
                }
            }
        }
    }
}
