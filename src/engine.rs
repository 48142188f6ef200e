use crate::collectors::CommandExecutor;
use crate::config::SamplerConfig;
use crate::control::{ProcessControl, ProcessTerminator};
use crate::sampler::ProcessSampler;
use crate::snapshot::SnapshotStore;
use std::sync::Arc;

/// One independent engine instance: a store shared by its sampler and its
/// lookup/termination surface. Instances never share state, so several can
/// run side by side (e.g. one per GPU query).
pub struct ProcessEngine<E: CommandExecutor, T: ProcessTerminator> {
    store: Arc<SnapshotStore>,
    sampler: Arc<ProcessSampler<E>>,
    control: ProcessControl<T>,
}

impl<E: CommandExecutor, T: ProcessTerminator> ProcessEngine<E, T> {
    pub fn new(config: &SamplerConfig, executor: E, terminator: T) -> Self {
        let store = Arc::new(SnapshotStore::new());
        let sampler = Arc::new(ProcessSampler::new(
            config.command.clone(),
            executor,
            Arc::clone(&store),
        ));
        let control = ProcessControl::new(Arc::clone(&store), terminator);
        Self {
            store,
            sampler,
            control,
        }
    }

    pub fn store(&self) -> &Arc<SnapshotStore> {
        &self.store
    }

    /// Shared handle, e.g. for a [`crate::monitor::ProcessMonitor`].
    pub fn sampler(&self) -> &Arc<ProcessSampler<E>> {
        &self.sampler
    }

    pub fn control(&self) -> &ProcessControl<T> {
        &self.control
    }
}
