//! Backend-neutral predicate definitions.

use crate::access::Value;
use serde::Serialize;
use std::fmt;

/// Equality test of one entity field against a constant
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldEquals {
    pub entity_kind: String,
    pub field: String,
    pub value: Value,
}

impl FieldEquals {
    pub fn new(entity_kind: impl Into<String>, field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            entity_kind: entity_kind.into(),
            field: field.into(),
            value: value.into(),
        }
    }
}

/// Compiled predicate tree, consumed by an executor
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Predicate {
    /// Matches everything
    True,
    /// Matches nothing
    False,
    FieldEquals(FieldEquals),
    Not(Box<Predicate>),
    And(Vec<Predicate>),
    Or(Vec<Predicate>),
}

impl Predicate {
    /// Create a field equality predicate
    pub fn field_equals(
        entity_kind: impl Into<String>,
        field: impl Into<String>,
        value: impl Into<Value>,
    ) -> Self {
        Predicate::FieldEquals(FieldEquals::new(entity_kind, field, value))
    }

    /// Create a NOT predicate; never simplified
    pub fn negate(operand: Predicate) -> Self {
        Predicate::Not(Box::new(operand))
    }

    /// Create an AND predicate over exactly these operands
    pub fn and(operands: Vec<Predicate>) -> Self {
        Predicate::And(operands)
    }

    /// Create an OR predicate over exactly these operands
    pub fn or(operands: Vec<Predicate>) -> Self {
        Predicate::Or(operands)
    }

    /// Conjunction with identity rules: no operands is `True`, a single
    /// operand is returned as is, otherwise an `And` in operand order.
    pub fn conjunction(mut operands: Vec<Predicate>) -> Self {
        match operands.len() {
            0 => Predicate::True,
            1 => operands.remove(0),
            _ => Predicate::And(operands),
        }
    }

    /// Disjunction with identity rules: no operands is `False`, a single
    /// operand is returned as is, otherwise an `Or` in operand order.
    pub fn disjunction(mut operands: Vec<Predicate>) -> Self {
        match operands.len() {
            0 => Predicate::False,
            1 => operands.remove(0),
            _ => Predicate::Or(operands),
        }
    }

    /// Field equality leaves in left-to-right order
    pub fn field_tests(&self) -> Vec<&FieldEquals> {
        let mut out = Vec::new();
        self.collect_field_tests(&mut out);
        out
    }

    fn collect_field_tests<'a>(&'a self, out: &mut Vec<&'a FieldEquals>) {
        match self {
            Predicate::True | Predicate::False => {}
            Predicate::FieldEquals(test) => out.push(test),
            Predicate::Not(operand) => operand.collect_field_tests(out),
            Predicate::And(operands) | Predicate::Or(operands) => {
                for operand in operands {
                    operand.collect_field_tests(out);
                }
            }
        }
    }

    fn fmt_operand(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::And(_) | Predicate::Or(_) => write!(f, "({})", self),
            _ => write!(f, "{}", self),
        }
    }

    fn fmt_joined(f: &mut fmt::Formatter<'_>, operands: &[Predicate], op: &str) -> fmt::Result {
        for (i, operand) in operands.iter().enumerate() {
            if i > 0 {
                write!(f, " {} ", op)?;
            }
            operand.fmt_operand(f)?;
        }
        Ok(())
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::True => f.write_str("TRUE"),
            Predicate::False => f.write_str("FALSE"),
            Predicate::FieldEquals(test) => {
                write!(f, "{}.{} = {}", test.entity_kind, test.field, test.value)
            }
            Predicate::Not(operand) => {
                f.write_str("NOT ")?;
                operand.fmt_operand(f)
            }
            Predicate::And(operands) if operands.is_empty() => f.write_str("AND()"),
            Predicate::Or(operands) if operands.is_empty() => f.write_str("OR()"),
            Predicate::And(operands) => Self::fmt_joined(f, operands, "AND"),
            Predicate::Or(operands) => Self::fmt_joined(f, operands, "OR"),
        }
    }
}
