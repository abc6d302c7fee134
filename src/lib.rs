pub mod access;
pub mod catalog;
pub mod executor;
pub mod predicate;
pub mod search;
