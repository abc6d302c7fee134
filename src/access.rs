//! Access layer for scalar values and stored records.
//!
//! - **DataType**: primitive types a searchable field can be declared with
//! - **Value**: type-safe representation of a field value, with strict
//!   conversion from JSON payload scalars
//! - **Record**: one stored entity, consumed by the in-memory executors

pub mod record;
pub mod value;

pub use record::Record;
pub use value::{DataType, Value};
