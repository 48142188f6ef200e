//! Samples a GPU's active processes, keeps the latest snapshot behind a
//! single lock, and offers pid-keyed lookup and termination.

pub mod utils {
    pub mod errors;
    pub mod logger;
    pub mod psutils;
}

pub mod collectors;
pub mod config;
pub mod control;
pub mod engine;
pub mod frame;
pub mod monitor;
pub mod parser;
pub mod record;
pub mod sampler;
pub mod snapshot;

pub use collectors::{CommandExecutor, DummyGpu, NvidiaSmi};
pub use config::SamplerConfig;
pub use control::{ProcessControl, ProcessTerminator, Selection, TerminateOutcome};
pub use engine::ProcessEngine;
pub use monitor::ProcessMonitor;
pub use record::{CellValue, Field, ProcessRecord, ProcessType};
pub use sampler::{ChangeNotifier, ProcessSampler, SubscriptionId};
pub use snapshot::{Snapshot, SnapshotStore};
pub use utils::errors::MonitoringError;
pub use utils::psutils::SignalTerminator;
