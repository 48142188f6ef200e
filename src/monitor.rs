use crate::collectors::CommandExecutor;
use crate::sampler::ProcessSampler;
use crate::utils::errors::MonitoringError;
use log::{info, warn};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;
use tokio::task::JoinHandle;

/// Background cadence for a sampler
/// # Type Parameters
/// * `E` - The command executor the sampler runs
pub struct ProcessMonitor<E: CommandExecutor> {
    /// Delay between cycles
    interval: Duration,
    sampler: Arc<ProcessSampler<E>>,
    /// Track whether the loop is currently running
    is_running: Arc<AtomicBool>,
    /// Number of cycles that returned an error
    failed_cycles: Arc<AtomicU64>,
    /// Handle to the background sampling task
    task_handle: Option<JoinHandle<()>>,
}

impl<E: CommandExecutor> ProcessMonitor<E> {
    /// `interval` usually comes from [`crate::config::SamplerConfig::interval`].
    pub fn new(sampler: Arc<ProcessSampler<E>>, interval: Duration) -> Self {
        Self {
            interval,
            sampler,
            is_running: Arc::new(AtomicBool::new(false)),
            failed_cycles: Arc::new(AtomicU64::new(0)),
            task_handle: None,
        }
    }

    pub fn sampler(&self) -> &Arc<ProcessSampler<E>> {
        &self.sampler
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Check if the background loop is currently running
    pub fn is_running(&self) -> bool {
        self.is_running.load(Ordering::Relaxed)
    }

    pub fn failed_cycles(&self) -> u64 {
        self.failed_cycles.load(Ordering::Relaxed)
    }

    async fn run_sampling_loop(
        sampler: Arc<ProcessSampler<E>>,
        is_running: Arc<AtomicBool>,
        failed_cycles: Arc<AtomicU64>,
        interval: Duration,
    ) {
        let mut iteration: u64 = 0;

        while is_running.load(Ordering::Relaxed) {
            tokio::time::sleep(interval).await;
            if !is_running.load(Ordering::Relaxed) {
                break;
            }
            iteration += 1;
            // run_cycle already logs the cause
            if sampler.run_cycle().await.is_err() {
                failed_cycles.fetch_add(1, Ordering::Relaxed);
            }
        }

        info!("Background sampling stopped after {} iterations", iteration);
    }

    /// Run one cycle immediately, then keep sampling in the background.
    /// A failure of the first cycle is returned and nothing is spawned.
    pub async fn commence(&mut self) -> Result<(), MonitoringError> {
        if self.is_running() {
            warn!("Process monitor is already running. Ignoring commence request.");
            return Ok(());
        }

        if self.interval.is_zero() {
            return Err(MonitoringError::Other(
                "Sampling interval must be greater than zero".to_string(),
            ));
        }

        self.sampler.run_cycle().await?;

        self.is_running.store(true, Ordering::Relaxed);
        let handle = tokio::spawn(Self::run_sampling_loop(
            Arc::clone(&self.sampler),
            Arc::clone(&self.is_running),
            Arc::clone(&self.failed_cycles),
            self.interval,
        ));
        self.task_handle = Some(handle);

        info!("Sampling started in background every {:?}", self.interval);
        Ok(())
    }

    pub fn shutdown(&mut self) {
        self.is_running.store(false, Ordering::Relaxed);
        if let Some(handle) = self.task_handle.take() {
            handle.abort();
        }
    }
}

impl<E: CommandExecutor> Drop for ProcessMonitor<E> {
    fn drop(&mut self) {
        self.shutdown();
    }
}
