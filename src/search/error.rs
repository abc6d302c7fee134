//! Error types for search payload resolution.

use serde_json::json;
use std::fmt;
use thiserror::Error;

/// One step from a parent payload node to a nested value
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    Field(String),
    Index(usize),
}

/// Location of a value inside the payload, from the root node
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct NodePath(Vec<PathSegment>);

impl NodePath {
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Path of a field of the node at this path
    pub fn field(&self, name: impl Into<String>) -> Self {
        let mut segments = self.0.clone();
        segments.push(PathSegment::Field(name.into()));
        Self(segments)
    }

    /// Path of an array element at this path
    pub fn index(&self, index: usize) -> Self {
        let mut segments = self.0.clone();
        segments.push(PathSegment::Index(index));
        Self(segments)
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("$");
        }
        for (i, segment) in self.0.iter().enumerate() {
            match segment {
                PathSegment::Field(name) if i == 0 => write!(f, "{}", name)?,
                PathSegment::Field(name) => write!(f, ".{}", name)?,
                PathSegment::Index(index) => write!(f, "[{}]", index)?,
            }
        }
        Ok(())
    }
}

/// What went wrong at a payload location
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ResolveErrorKind {
    #[error("expected a search node object, received {received}")]
    NotAnObject { received: serde_json::Value },

    #[error("'type' must be set for all search nodes")]
    MissingDiscriminator,

    /// Every attempted variant rejected the node because its tag differs
    /// from `seen`
    #[error(
        "no search node variant matches type '{seen}' (tried: {}; each accepts only its own tag)",
        .attempted.join(", ")
    )]
    NoMatchingVariant { seen: String, attempted: Vec<String> },

    #[error("unknown field '{field}' for {variant} node")]
    UnknownField { variant: String, field: String },

    #[error("expected {expected}, received {received}")]
    FieldTypeMismatch {
        expected: String,
        received: serde_json::Value,
    },

    #[error("missing required field '{field}' for {variant} node")]
    MissingField { variant: String, field: String },

    #[error("Not node requires exactly one child")]
    EmptyRequiredChild,

    #[error("search tree is nested deeper than the limit of {limit}")]
    DepthLimitExceeded { limit: usize },
}

impl ResolveErrorKind {
    /// Stable machine-readable name of this kind
    pub fn code(&self) -> &'static str {
        match self {
            ResolveErrorKind::NotAnObject { .. } => "NotAnObject",
            ResolveErrorKind::MissingDiscriminator => "MissingDiscriminator",
            ResolveErrorKind::NoMatchingVariant { .. } => "NoMatchingVariant",
            ResolveErrorKind::UnknownField { .. } => "UnknownField",
            ResolveErrorKind::FieldTypeMismatch { .. } => "FieldTypeMismatch",
            ResolveErrorKind::MissingField { .. } => "MissingField",
            ResolveErrorKind::EmptyRequiredChild => "EmptyRequiredChild",
            ResolveErrorKind::DepthLimitExceeded { .. } => "DepthLimitExceeded",
        }
    }
}

/// A single `(path, kind, message)` failure
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{path}: {kind}")]
pub struct ResolveError {
    pub path: NodePath,
    pub kind: ResolveErrorKind,
}

impl ResolveError {
    pub fn new(path: NodePath, kind: ResolveErrorKind) -> Self {
        Self { path, kind }
    }

    pub fn message(&self) -> String {
        self.kind.to_string()
    }

    /// Structured form suitable for an API error body
    pub fn to_json(&self) -> serde_json::Value {
        json!({
            "path": self.path.to_string(),
            "kind": self.kind.code(),
            "message": self.message(),
        })
    }
}

/// The complete failure list for one payload
#[derive(Debug, Clone, PartialEq)]
pub struct ResolveErrors(Vec<ResolveError>);

impl ResolveErrors {
    pub fn new(errors: Vec<ResolveError>) -> Self {
        Self(errors)
    }

    pub fn single(path: NodePath, kind: ResolveErrorKind) -> Self {
        Self(vec![ResolveError::new(path, kind)])
    }

    pub fn errors(&self) -> &[ResolveError] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ResolveError> {
        self.0.iter()
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Array(self.0.iter().map(ResolveError::to_json).collect())
    }
}

impl fmt::Display for ResolveErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, error) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}", error)?;
        }
        Ok(())
    }
}

impl std::error::Error for ResolveErrors {}

impl IntoIterator for ResolveErrors {
    type Item = ResolveError;
    type IntoIter = std::vec::IntoIter<ResolveError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Result type for resolution
pub type ResolveResult<T> = Result<T, ResolveErrors>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_display() {
        assert_eq!(NodePath::root().to_string(), "$");

        let path = NodePath::root()
            .field("children")
            .index(1)
            .field("child")
            .field("last_name");
        assert_eq!(path.to_string(), "children[1].child.last_name");
    }

    #[test]
    fn test_error_display() {
        let err = ResolveError::new(
            NodePath::root().field("unknown_field"),
            ResolveErrorKind::UnknownField {
                variant: "User".to_string(),
                field: "unknown_field".to_string(),
            },
        );
        assert_eq!(
            err.to_string(),
            "unknown_field: unknown field 'unknown_field' for User node"
        );

        let err = ResolveErrorKind::NoMatchingVariant {
            seen: "Robot".to_string(),
            attempted: vec!["Not".to_string(), "Or".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "no search node variant matches type 'Robot' (tried: Not, Or; each accepts only its own tag)"
        );

        let err = ResolveErrorKind::FieldTypeMismatch {
            expected: "int64".to_string(),
            received: serde_json::json!("abc"),
        };
        assert_eq!(err.to_string(), "expected int64, received \"abc\"");
    }

    #[test]
    fn test_error_list_display_and_json() {
        let errors = ResolveErrors::new(vec![
            ResolveError::new(NodePath::root(), ResolveErrorKind::MissingDiscriminator),
            ResolveError::new(
                NodePath::root().field("child"),
                ResolveErrorKind::EmptyRequiredChild,
            ),
        ]);
        assert_eq!(
            errors.to_string(),
            "$: 'type' must be set for all search nodes; child: Not node requires exactly one child"
        );

        let body = errors.to_json();
        assert_eq!(body[0]["kind"], "MissingDiscriminator");
        assert_eq!(body[1]["path"], "child");
    }
}
