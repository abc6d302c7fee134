//! Catalog of search node variants and their field schemas.
//!
//! Every payload node is checked against the variants in catalog order. A
//! variant accepts a node when the node's discriminator equals the variant's
//! tag, every field of the node is declared by the variant, and every field
//! value has its declared shape. Tags are unique across the catalog, so at
//! most one variant can ever accept a node.

use crate::access::{DataType, Value};
use crate::catalog::{CatalogError, EntityRegistry, EntitySchema};
use crate::search::error::{NodePath, ResolveError, ResolveErrorKind};
use crate::search::node::EntityPredicate;
use crate::search::DISCRIMINATOR;
use serde_json::Map;
use std::collections::HashSet;

/// Node shapes known to the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VariantKind {
    Not,
    Or,
    And,
    Entity,
}

/// Declared shape of a variant field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldShape {
    /// A single nested search node
    Node,
    /// An array of nested search nodes
    NodeList,
    /// A scalar of the given type; NULL means unset
    Scalar(DataType),
}

impl FieldShape {
    fn expected(&self) -> &'static str {
        match self {
            FieldShape::Node => "object",
            FieldShape::NodeList => "array",
            FieldShape::Scalar(data_type) => data_type.as_str(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantField {
    pub name: String,
    pub shape: FieldShape,
    pub required: bool,
}

impl VariantField {
    fn required(name: &str, shape: FieldShape) -> Self {
        Self {
            name: name.to_string(),
            shape,
            required: true,
        }
    }

    fn optional(name: &str, shape: FieldShape) -> Self {
        Self {
            name: name.to_string(),
            shape,
            required: false,
        }
    }
}

/// Fields extracted from a payload node that passed validation.
///
/// Nested nodes are still raw payload; the resolver recurses into them.
#[derive(Debug, PartialEq)]
pub enum ValidatedNode<'a> {
    Not { child: &'a serde_json::Value },
    Or { children: &'a [serde_json::Value] },
    And { children: &'a [serde_json::Value] },
    Entity(EntityPredicate),
}

/// Why a variant refused a payload node
#[derive(Debug, PartialEq)]
pub enum Rejection {
    /// Discriminator names a different variant
    TagMismatch,
    /// Tag matched but the fields did not
    Invalid(Vec<ResolveError>),
}

/// One known node shape: discriminator tag plus field schema
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variant {
    tag: String,
    kind: VariantKind,
    fields: Vec<VariantField>,
}

impl Variant {
    pub fn not() -> Self {
        Self {
            tag: "Not".to_string(),
            kind: VariantKind::Not,
            fields: vec![VariantField::required("child", FieldShape::Node)],
        }
    }

    pub fn or() -> Self {
        Self {
            tag: "Or".to_string(),
            kind: VariantKind::Or,
            fields: vec![VariantField::required("children", FieldShape::NodeList)],
        }
    }

    pub fn and() -> Self {
        Self {
            tag: "And".to_string(),
            kind: VariantKind::And,
            fields: vec![VariantField::required("children", FieldShape::NodeList)],
        }
    }

    /// Entity variant exposing only the schema's searchable fields
    pub fn entity(schema: &EntitySchema) -> Self {
        Self {
            tag: schema.name.clone(),
            kind: VariantKind::Entity,
            fields: schema
                .searchable_fields()
                .map(|f| VariantField::optional(&f.name, FieldShape::Scalar(f.data_type)))
                .collect(),
        }
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn kind(&self) -> VariantKind {
        self.kind
    }

    pub fn fields(&self) -> &[VariantField] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&VariantField> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Check a payload node against this variant's tag and field schema.
    ///
    /// Pure: the payload is only read. On failure every field error of the
    /// node is reported, not just the first.
    pub fn validate<'a>(
        &self,
        node: &'a Map<String, serde_json::Value>,
        path: &NodePath,
    ) -> Result<ValidatedNode<'a>, Rejection> {
        match node.get(DISCRIMINATOR).and_then(|t| t.as_str()) {
            Some(tag) if tag == self.tag => {}
            _ => return Err(Rejection::TagMismatch),
        }

        let mut errors = Vec::new();
        let mut entity = EntityPredicate::new(self.tag.clone());

        for (name, value) in node {
            if name == DISCRIMINATOR {
                continue;
            }

            let Some(field) = self.field(name) else {
                errors.push(ResolveError::new(
                    path.field(name),
                    ResolveErrorKind::UnknownField {
                        variant: self.tag.clone(),
                        field: name.clone(),
                    },
                ));
                continue;
            };

            // Required nested nodes set to null are reported as absent below
            if value.is_null() {
                continue;
            }

            let matches = match field.shape {
                FieldShape::Node => value.is_object(),
                FieldShape::NodeList => value.is_array(),
                FieldShape::Scalar(data_type) => match Value::from_json(value, data_type) {
                    Some(scalar) => {
                        entity.set(name.clone(), scalar);
                        true
                    }
                    None => false,
                },
            };

            if !matches {
                errors.push(ResolveError::new(
                    path.field(name),
                    ResolveErrorKind::FieldTypeMismatch {
                        expected: field.shape.expected().to_string(),
                        received: value.clone(),
                    },
                ));
            }
        }

        for field in self.fields.iter().filter(|f| f.required) {
            if node.get(&field.name).map_or(true, |v| v.is_null()) {
                let kind = match self.kind {
                    VariantKind::Not => ResolveErrorKind::EmptyRequiredChild,
                    _ => ResolveErrorKind::MissingField {
                        variant: self.tag.clone(),
                        field: field.name.clone(),
                    },
                };
                errors.push(ResolveError::new(path.field(&field.name), kind));
            }
        }

        if !errors.is_empty() {
            return Err(Rejection::Invalid(errors));
        }

        let validated = match self.kind {
            VariantKind::Not => ValidatedNode::Not {
                child: &node["child"],
            },
            VariantKind::Or => ValidatedNode::Or {
                children: node_list(node),
            },
            VariantKind::And => ValidatedNode::And {
                children: node_list(node),
            },
            VariantKind::Entity => ValidatedNode::Entity(entity),
        };
        Ok(validated)
    }
}

fn node_list(node: &Map<String, serde_json::Value>) -> &[serde_json::Value] {
    node.get("children")
        .and_then(|c| c.as_array())
        .map(|c| c.as_slice())
        .unwrap_or(&[])
}

/// Ordered list of variants tried during resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantCatalog {
    variants: Vec<Variant>,
}

impl VariantCatalog {
    /// Build the catalog `Not`, `Or`, `And`, then one entity variant per
    /// registered entity kind in registry order.
    pub fn new(registry: &EntityRegistry) -> Result<Self, CatalogError> {
        let mut variants = vec![Variant::not(), Variant::or(), Variant::and()];
        variants.extend(registry.entities().iter().map(Variant::entity));
        Self::from_variants(variants)
    }

    /// Build a catalog from an explicit variant list, rejecting duplicate tags
    pub fn from_variants(variants: Vec<Variant>) -> Result<Self, CatalogError> {
        let mut tags = HashSet::new();
        for variant in &variants {
            if !tags.insert(variant.tag.as_str()) {
                return Err(CatalogError::DuplicateVariantTag(variant.tag.clone()));
            }
        }
        Ok(Self { variants })
    }

    pub fn variants(&self) -> &[Variant] {
        &self.variants
    }

    /// Tags in trial order
    pub fn tags(&self) -> Vec<&str> {
        self.variants.iter().map(|v| v.tag()).collect()
    }

    pub fn get(&self, tag: &str) -> Option<&Variant> {
        self.variants.iter().find(|v| v.tag == tag)
    }
}
