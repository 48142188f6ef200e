//! Lookup and termination of sampled processes, keyed by pid.

use crate::record::ProcessRecord;
use crate::snapshot::SnapshotStore;
use crate::utils::errors::MonitoringError;
use log::{debug, info};
use std::sync::Arc;

/// Asks the operating system to terminate a process.
pub trait ProcessTerminator: Send + Sync {
    fn terminate(&self, pid: u32) -> Result<(), MonitoringError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TerminateOutcome {
    /// The pid was in the current snapshot and the signal was issued.
    Signalled(ProcessRecord),
    /// The pid is not in the current snapshot; nothing was sent.
    NotFound,
}

pub struct ProcessControl<T: ProcessTerminator> {
    store: Arc<SnapshotStore>,
    terminator: T,
}

impl<T: ProcessTerminator> ProcessControl<T> {
    pub fn new(store: Arc<SnapshotStore>, terminator: T) -> Self {
        Self { store, terminator }
    }

    pub fn store(&self) -> &Arc<SnapshotStore> {
        &self.store
    }

    #[cfg(test)]
    pub(crate) fn terminator(&self) -> &T {
        &self.terminator
    }

    /// Current position of `pid`. Positions change between cycles, pids do not.
    pub fn index_of_pid(&self, pid: &str) -> Option<usize> {
        self.store.index_of_pid(pid)
    }

    pub fn find_by_pid(&self, pid: &str) -> Option<ProcessRecord> {
        self.store.find_by_pid(pid)
    }

    /// Terminate the process owning `pid` if it is in the current snapshot.
    ///
    /// The presence check runs under the store lock; the signal is sent
    /// after it is released. The snapshot itself is left alone, the next
    /// cycle reflects the exit.
    pub fn terminate(&self, pid: &str) -> Result<TerminateOutcome, MonitoringError> {
        let Some(record) = self.store.find_by_pid(pid) else {
            debug!("Pid {} not in current snapshot, nothing to terminate", pid);
            return Ok(TerminateOutcome::NotFound);
        };
        let os_pid = record
            .pid_number()
            .ok_or_else(|| MonitoringError::InvalidPid(record.pid.clone()))?;

        info!("Terminating {} (pid {})", record.name, os_pid);
        self.terminator.terminate(os_pid)?;
        Ok(TerminateOutcome::Signalled(record))
    }
}

/// The consumer's "process of interest", remembered by pid so it survives
/// snapshot replacement.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pid: Option<String>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select(&mut self, pid: impl Into<String>) {
        self.pid = Some(pid.into());
    }

    /// Select whatever record sits at `index` in the current snapshot, or
    /// clear the selection when there is none.
    pub fn select_index(&mut self, store: &SnapshotStore, index: usize) {
        self.pid = store.with_snapshot(|s| s.records.get(index).map(|r| r.pid.clone()));
    }

    pub fn clear(&mut self) {
        self.pid = None;
    }

    pub fn pid(&self) -> Option<&str> {
        self.pid.as_deref()
    }

    /// Row of the selected pid in the current snapshot.
    pub fn resolve(&self, store: &SnapshotStore) -> Option<usize> {
        self.pid.as_deref().and_then(|pid| store.index_of_pid(pid))
    }

    /// Terminate the selected process. The selection is cleared once a
    /// signal has been sent; a miss or an error leaves it untouched.
    pub fn terminate_selected<T: ProcessTerminator>(
        &mut self,
        control: &ProcessControl<T>,
    ) -> Result<TerminateOutcome, MonitoringError> {
        let Some(pid) = self.pid.as_deref() else {
            return Ok(TerminateOutcome::NotFound);
        };
        let outcome = control.terminate(pid)?;
        if matches!(outcome, TerminateOutcome::Signalled(_)) {
            self.clear();
        }
        Ok(outcome)
    }
}
