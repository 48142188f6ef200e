pub mod dummy;
pub mod nvidia_smi;

pub use dummy::DummyGpu;
pub use nvidia_smi::NvidiaSmi;

use crate::utils::errors::MonitoringError;
use async_trait::async_trait;

/// Runs a command string and hands back its standard output.
#[async_trait]
pub trait CommandExecutor: Send + Sync + 'static {
    /// Run `command` to completion. Any failure to produce output,
    /// including a non-zero exit, is an `ExecutionFailure`.
    async fn exec(&self, command: &str) -> Result<String, MonitoringError>;
}
