//! Executor layer for running compiled predicates.
//!
//! This module implements the Volcano-style iterator model over in-memory
//! records. Each executor produces records one at a time via the `next()`
//! method, so a scan and a filter compose into a pipeline.

use crate::access::Record;
use anyhow::Result;

pub mod filter;
pub mod scan;

pub use filter::FilterExecutor;
pub use scan::MemoryScanExecutor;

/// Trait for all record executors
pub trait Executor: Send {
    /// Initialize the executor. This must be called before `next()`.
    fn init(&mut self) -> Result<()>;

    /// Get the next record from the executor.
    /// Returns None when there are no more records.
    fn next(&mut self) -> Result<Option<Record>>;
}

/// Initialize an executor and collect everything it produces
pub fn drain(executor: &mut dyn Executor) -> Result<Vec<Record>> {
    executor.init()?;
    let mut records = Vec::new();
    while let Some(record) = executor.next()? {
        records.push(record);
    }
    Ok(records)
}
