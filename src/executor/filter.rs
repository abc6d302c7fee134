//! Filter executor implementation.
//!
//! This executor filters records from a child executor using a compiled
//! predicate. It implements the volcano-style iterator model, producing one
//! record at a time that matches the predicate.

use crate::access::{Record, Value};
use crate::executor::Executor;
use crate::predicate::{evaluate_predicate, Predicate};
use anyhow::{bail, Result};
use log::trace;

/// Executor that filters records based on a predicate
pub struct FilterExecutor {
    /// Child executor that produces records
    child: Box<dyn Executor>,
    /// Predicate that evaluates to boolean or NULL
    predicate: Predicate,
    /// Whether the executor has been initialized
    initialized: bool,
}

impl FilterExecutor {
    /// Create a new filter executor
    ///
    /// # Arguments
    /// * `child` - The child executor that produces records
    /// * `predicate` - The compiled search predicate
    pub fn new(child: Box<dyn Executor>, predicate: Predicate) -> Self {
        Self {
            child,
            predicate,
            initialized: false,
        }
    }
}

impl Executor for FilterExecutor {
    fn init(&mut self) -> Result<()> {
        if self.initialized {
            return Ok(());
        }

        self.child.init()?;

        self.initialized = true;
        Ok(())
    }

    fn next(&mut self) -> Result<Option<Record>> {
        if !self.initialized {
            bail!("Executor not initialized. Call init() first.");
        }

        // Keep getting records from child until we find one that matches
        loop {
            match self.child.next()? {
                Some(record) => match evaluate_predicate(&self.predicate, &record)? {
                    Value::Boolean(true) => return Ok(Some(record)),
                    Value::Boolean(false) => {}
                    Value::Null => {
                        // NULL is treated as false, as in a WHERE clause
                        trace!("Predicate is NULL for {} record", record.entity_kind());
                    }
                    _ => bail!("Predicate did not evaluate to boolean"),
                },
                None => return Ok(None),
            }
        }
    }
}
