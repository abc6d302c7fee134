//! Predicate evaluation against in-memory records.
//!
//! Uses three-valued logic: an equality test on an unset (NULL) field yields
//! NULL, and NULL then flows through NOT, AND and OR the way SQL defines.

use crate::access::{Record, Value};
use crate::predicate::{FieldEquals, Predicate};
use std::fmt;

/// Errors that can occur during predicate evaluation
#[derive(Debug, Clone, PartialEq)]
pub enum EvalError {
    /// The predicate tests a field of another entity kind
    EntityKindMismatch { expected: String, actual: String },

    /// Field value and constant cannot be compared
    IncomparableValues {
        field: String,
        left: Value,
        right: Value,
    },
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvalError::EntityKindMismatch { expected, actual } => {
                write!(
                    f,
                    "Predicate tests {} fields but record is a {}",
                    expected, actual
                )
            }
            EvalError::IncomparableValues { field, left, right } => {
                write!(
                    f,
                    "Cannot compare field {} value {} with {}",
                    field, left, right
                )
            }
        }
    }
}

impl std::error::Error for EvalError {}

pub type EvalResult<T> = Result<T, EvalError>;

/// Evaluator for predicates over a single record
pub struct PredicateEvaluator<'a> {
    record: &'a Record,
}

impl<'a> PredicateEvaluator<'a> {
    pub fn new(record: &'a Record) -> Self {
        Self { record }
    }

    /// Evaluate a predicate; the result is `Boolean` or `Null`
    pub fn evaluate(&self, predicate: &Predicate) -> EvalResult<Value> {
        match predicate {
            Predicate::True => Ok(Value::Boolean(true)),
            Predicate::False => Ok(Value::Boolean(false)),
            Predicate::FieldEquals(test) => self.evaluate_field_equals(test),
            Predicate::Not(operand) => match self.evaluate(operand)? {
                Value::Boolean(b) => Ok(Value::Boolean(!b)),
                _ => Ok(Value::Null),
            },
            Predicate::And(operands) => self.evaluate_and(operands),
            Predicate::Or(operands) => self.evaluate_or(operands),
        }
    }

    fn evaluate_field_equals(&self, test: &FieldEquals) -> EvalResult<Value> {
        if test.entity_kind != self.record.entity_kind() {
            return Err(EvalError::EntityKindMismatch {
                expected: test.entity_kind.clone(),
                actual: self.record.entity_kind().to_string(),
            });
        }

        let left = self.record.get(&test.field);
        let right = &test.value;
        let equal = match (left, right) {
            (Value::Null, _) | (_, Value::Null) => return Ok(Value::Null),
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Int64(a), Value::Int64(b)) => a == b,
            (Value::Float64(a), Value::Float64(b)) => a == b,
            (Value::Int64(a), Value::Float64(b)) => (*a as f64) == *b,
            (Value::Float64(a), Value::Int64(b)) => *a == (*b as f64),
            (Value::String(a), Value::String(b)) => a == b,
            _ => {
                return Err(EvalError::IncomparableValues {
                    field: test.field.clone(),
                    left: left.clone(),
                    right: right.clone(),
                })
            }
        };
        Ok(Value::Boolean(equal))
    }

    /// FALSE wins over NULL; empty is TRUE
    fn evaluate_and(&self, operands: &[Predicate]) -> EvalResult<Value> {
        let mut saw_null = false;
        for operand in operands {
            match self.evaluate(operand)? {
                Value::Boolean(false) => return Ok(Value::Boolean(false)),
                Value::Boolean(true) => {}
                _ => saw_null = true,
            }
        }
        Ok(if saw_null {
            Value::Null
        } else {
            Value::Boolean(true)
        })
    }

    /// TRUE wins over NULL; empty is FALSE
    fn evaluate_or(&self, operands: &[Predicate]) -> EvalResult<Value> {
        let mut saw_null = false;
        for operand in operands {
            match self.evaluate(operand)? {
                Value::Boolean(true) => return Ok(Value::Boolean(true)),
                Value::Boolean(false) => {}
                _ => saw_null = true,
            }
        }
        Ok(if saw_null {
            Value::Null
        } else {
            Value::Boolean(false)
        })
    }
}

/// Helper function to evaluate a predicate against a record
pub fn evaluate_predicate(predicate: &Predicate, record: &Record) -> EvalResult<Value> {
    PredicateEvaluator::new(record).evaluate(predicate)
}

/// Whether a record satisfies a predicate. NULL is treated as false.
pub fn predicate_matches(predicate: &Predicate, record: &Record) -> EvalResult<bool> {
    Ok(matches!(
        evaluate_predicate(predicate, record)?,
        Value::Boolean(true)
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn john() -> Record {
        Record::new("User")
            .with("id", 1)
            .with("first_name", "John")
            .with("company_id", 42)
    }

    fn eq(field: &str, value: impl Into<Value>) -> Predicate {
        Predicate::field_equals("User", field, value)
    }

    #[test]
    fn test_constants() {
        let record = john();
        assert_eq!(evaluate_predicate(&Predicate::True, &record), Ok(Value::Boolean(true)));
        assert_eq!(evaluate_predicate(&Predicate::False, &record), Ok(Value::Boolean(false)));
        assert_eq!(
            evaluate_predicate(&Predicate::and(vec![]), &record),
            Ok(Value::Boolean(true))
        );
        assert_eq!(
            evaluate_predicate(&Predicate::or(vec![]), &record),
            Ok(Value::Boolean(false))
        );
    }

    #[test]
    fn test_field_equals() {
        let record = john();
        assert_eq!(predicate_matches(&eq("first_name", "John"), &record), Ok(true));
        assert_eq!(predicate_matches(&eq("first_name", "Jane"), &record), Ok(false));
        assert_eq!(predicate_matches(&eq("company_id", 42), &record), Ok(true));
    }

    #[test]
    fn test_unset_field_is_null() {
        let record = john();
        assert_eq!(evaluate_predicate(&eq("last_name", "Doe"), &record), Ok(Value::Null));
        assert_eq!(
            evaluate_predicate(&Predicate::negate(eq("last_name", "Doe")), &record),
            Ok(Value::Null)
        );
        assert_eq!(predicate_matches(&eq("last_name", "Doe"), &record), Ok(false));
    }

    #[test]
    fn test_three_valued_logic() {
        let record = john();
        let unknown = eq("last_name", "Doe");

        // NULL AND FALSE = FALSE, NULL AND TRUE = NULL
        assert_eq!(
            evaluate_predicate(&Predicate::and(vec![unknown.clone(), Predicate::False]), &record),
            Ok(Value::Boolean(false))
        );
        assert_eq!(
            evaluate_predicate(&Predicate::and(vec![unknown.clone(), Predicate::True]), &record),
            Ok(Value::Null)
        );

        // NULL OR TRUE = TRUE, NULL OR FALSE = NULL
        assert_eq!(
            evaluate_predicate(&Predicate::or(vec![unknown.clone(), Predicate::True]), &record),
            Ok(Value::Boolean(true))
        );
        assert_eq!(
            evaluate_predicate(&Predicate::or(vec![unknown, Predicate::False]), &record),
            Ok(Value::Null)
        );
    }

    #[test]
    fn test_numeric_widening() {
        let record = Record::new("User").with("company_id", 42);
        assert_eq!(predicate_matches(&eq("company_id", 42.0), &record), Ok(true));
    }

    #[test]
    fn test_errors() {
        let record = john();
        let other = Predicate::field_equals("Company", "name", "Acme");
        assert_eq!(
            evaluate_predicate(&other, &record),
            Err(EvalError::EntityKindMismatch {
                expected: "Company".to_string(),
                actual: "User".to_string(),
            })
        );

        let err = evaluate_predicate(&eq("first_name", 7), &record).unwrap_err();
        assert!(matches!(err, EvalError::IncomparableValues { .. }));
        assert_eq!(
            err.to_string(),
            "Cannot compare field first_name value 'John' with 7"
        );
    }
}
