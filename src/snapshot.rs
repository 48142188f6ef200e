//! The latest sampled process list, shared between the sampler and readers.

use crate::record::ProcessRecord;
use chrono::{DateTime, Utc};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// One complete sampling result.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub records: Vec<ProcessRecord>,
    /// `None` until the first successful replace.
    pub sampled_at: Option<DateTime<Utc>>,
    /// Incremented on every replace.
    pub generation: u64,
}

impl Snapshot {
    pub fn index_of_pid(&self, pid: &str) -> Option<usize> {
        self.records.iter().position(|r| r.pid == pid)
    }

    pub fn find_by_pid(&self, pid: &str) -> Option<&ProcessRecord> {
        self.records.iter().find(|r| r.pid == pid)
    }
}

/// A single lock guards the whole sequence. The sequence is only ever
/// swapped wholesale, so no reader can see two cycles mixed together.
#[derive(Debug, Default)]
pub struct SnapshotStore {
    inner: Mutex<Snapshot>,
}

impl SnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    // Mutation is a single assignment, so a poisoned lock still guards a whole snapshot.
    fn lock(&self) -> MutexGuard<'_, Snapshot> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Discard the current sequence and install `records`. Returns the new generation.
    pub fn replace(&self, records: Vec<ProcessRecord>) -> u64 {
        let mut snapshot = self.lock();
        snapshot.records = records;
        snapshot.sampled_at = Some(Utc::now());
        snapshot.generation += 1;
        snapshot.generation
    }

    /// A consistent copy of the current snapshot.
    pub fn snapshot(&self) -> Snapshot {
        self.lock().clone()
    }

    /// Just the records of the current snapshot.
    pub fn records(&self) -> Vec<ProcessRecord> {
        self.lock().records.clone()
    }

    /// Scoped read access without cloning. The lock is held while `f` runs,
    /// so `f` must not call back into the store.
    pub fn with_snapshot<R>(&self, f: impl FnOnce(&Snapshot) -> R) -> R {
        f(&self.lock())
    }

    pub fn find_by_pid(&self, pid: &str) -> Option<ProcessRecord> {
        self.lock().find_by_pid(pid).cloned()
    }

    pub fn index_of_pid(&self, pid: &str) -> Option<usize> {
        self.lock().index_of_pid(pid)
    }

    pub fn contains_pid(&self, pid: &str) -> bool {
        self.index_of_pid(pid).is_some()
    }

    pub fn len(&self) -> usize {
        self.lock().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn generation(&self) -> u64 {
        self.lock().generation
    }
}
