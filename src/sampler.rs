//! One sampling cycle: execute, parse, replace, notify.

use crate::collectors::CommandExecutor;
use crate::parser::{self, HEADER_LINES};
use crate::snapshot::SnapshotStore;
use crate::utils::errors::MonitoringError;
use log::{debug, warn};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

type Listener = Arc<dyn Fn() + Send + Sync>;

/// Handle returned by [`ChangeNotifier::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// The "snapshot updated" signal. Listeners run synchronously on the
/// sampling thread, after the store is back in a consistent state.
#[derive(Default)]
pub struct ChangeNotifier {
    next_id: AtomicU64,
    listeners: Mutex<Vec<(SubscriptionId, Listener)>>,
}

impl ChangeNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, listener: impl Fn() + Send + Sync + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let listener: Listener = Arc::new(listener);
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, listener));
        id
    }

    /// Returns false if `id` was not subscribed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut listeners = self.listeners.lock().unwrap_or_else(PoisonError::into_inner);
        let before = listeners.len();
        listeners.retain(|(sub, _)| *sub != id);
        listeners.len() != before
    }

    pub fn subscriber_count(&self) -> usize {
        self.listeners.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn notify(&self) {
        // Listeners are called outside the registry lock so they may (un)subscribe.
        let listeners: Vec<Listener> = self
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();
        for listener in listeners {
            listener();
        }
    }
}

/// Drives sampling cycles against an injected store.
pub struct ProcessSampler<E: CommandExecutor> {
    command: String,
    executor: E,
    store: Arc<SnapshotStore>,
    notifier: ChangeNotifier,
}

impl<E: CommandExecutor> ProcessSampler<E> {
    pub fn new(command: impl Into<String>, executor: E, store: Arc<SnapshotStore>) -> Self {
        Self {
            command: command.into(),
            executor,
            store,
            notifier: ChangeNotifier::new(),
        }
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    pub fn store(&self) -> &Arc<SnapshotStore> {
        &self.store
    }

    pub fn notifier(&self) -> &ChangeNotifier {
        &self.notifier
    }

    /// Shorthand for `notifier().subscribe(..)`.
    pub fn subscribe(&self, listener: impl Fn() + Send + Sync + 'static) -> SubscriptionId {
        self.notifier.subscribe(listener)
    }

    /// Run one cycle and return the number of records now in the store.
    ///
    /// On any error the store keeps its previous snapshot and no
    /// notification is sent. The store lock is never held while the
    /// command runs.
    pub async fn run_cycle(&self) -> Result<usize, MonitoringError> {
        let raw = self.executor.exec(&self.command).await.inspect_err(|e| {
            warn!("Sampling command failed, keeping last snapshot: {}", e);
        })?;

        let text = parser::normalize(&raw);
        if text.lines().count() < HEADER_LINES {
            let err = MonitoringError::ExecutionFailure(format!(
                "Expected at least {} header lines, got {:?}",
                HEADER_LINES, text
            ));
            warn!("Sampling command produced no usable output: {}", err);
            return Err(err);
        }

        let records = parser::parse(text).inspect_err(|e| {
            warn!("Discarding malformed sample: {}", e);
        })?;
        let count = records.len();
        let generation = self.store.replace(records);
        debug!("Snapshot {} installed with {} processes", generation, count);

        self.notifier.notify();
        Ok(count)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::atomic::AtomicUsize;
    use std::sync::mpsc;
    use std::thread;
    use std::time::Duration;

    pub(crate) const TWO_PROCS: &str = "header line A
header line B
chrome         G   0   1234   10   20   0   0   512
python         C   0   5678   55   40   5   3   2048
";

    /// Hands out queued results in order, then keeps failing.
    #[derive(Default)]
    pub(crate) struct ScriptedExecutor {
        pub responses: Mutex<VecDeque<Result<String, MonitoringError>>>,
        pub commands: Mutex<Vec<String>>,
    }

    impl ScriptedExecutor {
        pub(crate) fn new(responses: Vec<Result<String, MonitoringError>>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
                commands: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl CommandExecutor for ScriptedExecutor {
        async fn exec(&self, command: &str) -> Result<String, MonitoringError> {
            self.commands.lock().unwrap().push(command.to_string());
            self.responses.lock().unwrap().pop_front().unwrap_or_else(|| {
                Err(MonitoringError::ExecutionFailure("script exhausted".to_string()))
            })
        }
    }

    /// True if a fresh thread can read `store` within a second. Never blocks
    /// the caller for longer than that, even if the lock is held.
    pub(crate) fn readable_from_other_thread(store: &Arc<SnapshotStore>) -> bool {
        let store = Arc::clone(store);
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let _ = tx.send(store.len());
        });
        rx.recv_timeout(Duration::from_secs(1)).is_ok()
    }

    /// Reads the shared store from inside `exec`, then returns a fixed sample.
    struct StoreReadingExecutor {
        store: Arc<SnapshotStore>,
        readable: Mutex<Vec<bool>>,
    }

    #[async_trait]
    impl CommandExecutor for StoreReadingExecutor {
        async fn exec(&self, _command: &str) -> Result<String, MonitoringError> {
            self.readable
                .lock()
                .unwrap()
                .push(readable_from_other_thread(&self.store));
            Ok(TWO_PROCS.to_string())
        }
    }

    fn sampler(responses: Vec<Result<String, MonitoringError>>) -> ProcessSampler<ScriptedExecutor> {
        ProcessSampler::new(
            "gpu-query",
            ScriptedExecutor::new(responses),
            Arc::new(SnapshotStore::new()),
        )
    }

    #[tokio::test]
    async fn test_run_cycle_installs_records_and_notifies() {
        let sampler = sampler(vec![Ok(TWO_PROCS.to_string())]);
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&fired);
        sampler.subscribe(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        assert_eq!(sampler.run_cycle().await.unwrap(), 2);
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert_eq!(sampler.store().find_by_pid("5678").unwrap().name, "python");
        assert_eq!(
            sampler.executor.commands.lock().unwrap().as_slice(),
            ["gpu-query".to_string()]
        );
    }

    #[tokio::test]
    async fn test_failed_exec_keeps_last_snapshot() {
        let sampler = sampler(vec![
            Ok(TWO_PROCS.to_string()),
            Err(MonitoringError::ExecutionFailure("nvidia-smi not found".to_string())),
        ]);
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&fired);
        sampler.subscribe(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        sampler.run_cycle().await.unwrap();
        let before = sampler.store().snapshot();

        let err = sampler.run_cycle().await.unwrap_err();
        assert!(matches!(err, MonitoringError::ExecutionFailure(_)));

        let after = sampler.store().snapshot();
        assert_eq!(after.records, before.records);
        assert_eq!(after.generation, before.generation);
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_format_violation_keeps_last_snapshot() {
        let sampler = sampler(vec![
            Ok(TWO_PROCS.to_string()),
            Ok("h1\nh2\nbroken C 0\n".to_string()),
        ]);
        sampler.run_cycle().await.unwrap();

        let err = sampler.run_cycle().await.unwrap_err();
        assert!(matches!(err, MonitoringError::FormatViolation { line: 2, .. }));
        assert_eq!(sampler.store().len(), 2);
    }

    #[tokio::test]
    async fn test_empty_output_is_execution_failure() {
        let sampler = sampler(vec![Ok(TWO_PROCS.to_string()), Ok("  \n\n".to_string())]);
        sampler.run_cycle().await.unwrap();

        assert!(matches!(
            sampler.run_cycle().await,
            Err(MonitoringError::ExecutionFailure(_))
        ));
        assert_eq!(sampler.store().len(), 2);
    }

    #[tokio::test]
    async fn test_headers_only_clears_snapshot() {
        let sampler = sampler(vec![
            Ok(TWO_PROCS.to_string()),
            Ok("# gpu pid\n# Idx #\n".to_string()),
        ]);
        sampler.run_cycle().await.unwrap();
        assert_eq!(sampler.run_cycle().await.unwrap(), 0);
        assert!(sampler.store().is_empty());
        assert_eq!(sampler.store().generation(), 2);
    }

    #[test]
    fn test_unsubscribe() {
        let notifier = ChangeNotifier::new();
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&fired);
        let id = notifier.subscribe(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        notifier.subscribe(|| {});
        assert_eq!(notifier.subscriber_count(), 2);

        notifier.notify();
        assert!(notifier.unsubscribe(id));
        assert!(!notifier.unsubscribe(id));
        notifier.notify();

        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert_eq!(notifier.subscriber_count(), 1);
    }

    #[tokio::test]
    async fn test_store_unlocked_while_command_runs() {
        let store = Arc::new(SnapshotStore::new());
        let sampler = ProcessSampler::new(
            "gpu-query",
            StoreReadingExecutor {
                store: Arc::clone(&store),
                readable: Mutex::new(Vec::new()),
            },
            Arc::clone(&store),
        );

        let count = tokio::time::timeout(Duration::from_secs(5), sampler.run_cycle())
            .await
            .expect("sampling cycle hung")
            .unwrap();
        assert_eq!(count, 2);
        assert_eq!(*sampler.executor.readable.lock().unwrap(), vec![true]);
    }
}
