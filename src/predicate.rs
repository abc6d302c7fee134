//! Backend-neutral predicates compiled from search trees.
//!
//! This module provides:
//! - The predicate tree (`TRUE`, `FALSE`, field equality, NOT, AND, OR)
//! - Compilation of a resolved search tree into a predicate
//! - Three-valued evaluation of predicates against in-memory records

pub mod compiler;
pub mod eval;
pub mod expr;

pub use compiler::{compile_tree, CompileError, PredicateCompiler};
pub use eval::{evaluate_predicate, predicate_matches, EvalError, EvalResult, PredicateEvaluator};
pub use expr::{FieldEquals, Predicate};
