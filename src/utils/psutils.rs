use crate::control::ProcessTerminator;
use crate::utils::errors::MonitoringError;
use log::info;
use sysinfo::{Pid, Process, ProcessRefreshKind, ProcessesToUpdate, Signal, System, UpdateKind};
use users::{Users, UsersCache};

pub fn resolve_username(uid: u32, users_cache: &UsersCache) -> String {
    users_cache
        .get_user_by_uid(uid)
        .map(|user| user.name().to_string_lossy().to_string())
        .unwrap_or_else(|| uid.to_string())
}

/// Load a single process into a fresh `System`, including its owner.
fn load_process(pid: u32) -> System {
    let mut system = System::new();
    system.refresh_processes_specifics(
        ProcessesToUpdate::Some(&[Pid::from_u32(pid)]),
        true,
        ProcessRefreshKind::nothing().with_user(UpdateKind::Always),
    );
    system
}

/// Owner of an already loaded process, `unknown` when sysinfo has no uid for it.
fn owner_name(process: &Process) -> String {
    process
        .user_id()
        .map(|uid| resolve_username(**uid, &UsersCache::new()))
        .unwrap_or_else(|| "unknown".to_string())
}

/// Sends SIGTERM through sysinfo. Failures are returned, not swallowed.
#[derive(Debug, Default, Clone, Copy)]
pub struct SignalTerminator;

impl ProcessTerminator for SignalTerminator {
    fn terminate(&self, pid: u32) -> Result<(), MonitoringError> {
        let system = load_process(pid);
        let process = system.process(Pid::from_u32(pid)).ok_or_else(|| {
            MonitoringError::TerminationFailure {
                pid: pid.to_string(),
                reason: "no such process".to_string(),
            }
        })?;

        match process.kill_with(Signal::Term) {
            Some(true) => {
                info!("Sent SIGTERM to {} (pid {})", process.name().to_string_lossy(), pid);
                Ok(())
            }
            Some(false) => Err(MonitoringError::TerminationFailure {
                pid: pid.to_string(),
                reason: format!(
                    "signal rejected by the OS (process owned by {})",
                    owner_name(process)
                ),
            }),
            None => Err(MonitoringError::TerminationFailure {
                pid: pid.to_string(),
                reason: "SIGTERM is not supported on this platform".to_string(),
            }),
        }
    }
}
