//! In-memory scan executor implementation.

use crate::access::Record;
use crate::executor::Executor;
use anyhow::{bail, Result};
use std::collections::VecDeque;

/// Executor for sequential scans over records held in memory
pub struct MemoryScanExecutor {
    records: Vec<Record>,
    /// Only records of this kind are produced when set
    entity_kind: Option<String>,
    pending: VecDeque<Record>,
    initialized: bool,
}

impl MemoryScanExecutor {
    /// Create a scan over every record
    pub fn new(records: Vec<Record>) -> Self {
        Self {
            records,
            entity_kind: None,
            pending: VecDeque::new(),
            initialized: false,
        }
    }

    /// Create a scan that only yields records of one entity kind
    pub fn for_entity(records: Vec<Record>, entity_kind: impl Into<String>) -> Self {
        Self {
            entity_kind: Some(entity_kind.into()),
            ..Self::new(records)
        }
    }
}

impl Executor for MemoryScanExecutor {
    fn init(&mut self) -> Result<()> {
        if self.initialized {
            return Ok(());
        }

        self.pending = self
            .records
            .iter()
            .filter(|r| {
                self.entity_kind
                    .as_deref()
                    .map_or(true, |kind| r.entity_kind() == kind)
            })
            .cloned()
            .collect();

        self.initialized = true;
        Ok(())
    }

    fn next(&mut self) -> Result<Option<Record>> {
        if !self.initialized {
            bail!("Executor not initialized. Call init() first.");
        }
        Ok(self.pending.pop_front())
    }
}
