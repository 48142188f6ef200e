use crate::collectors::CommandExecutor;
use crate::utils::errors::MonitoringError;
use async_trait::async_trait;
use log::debug;
use tokio::process::Command;

/// Runs sampling commands through a shell so pipelines like the default
/// `nvidia-smi pmon | awk` one work unchanged.
pub struct NvidiaSmi {
    pub shell: String,
}

impl NvidiaSmi {
    pub fn new(shell: Option<String>) -> Self {
        let shell = shell.unwrap_or_else(|| "sh".to_string());
        Self { shell }
    }
}

impl Default for NvidiaSmi {
    fn default() -> Self {
        Self::new(None)
    }
}

#[async_trait]
impl CommandExecutor for NvidiaSmi {
    async fn exec(&self, command: &str) -> Result<String, MonitoringError> {
        debug!("Running sampling command via {}: {}", self.shell, command);
        let output = Command::new(&self.shell)
            .arg("-c")
            .arg(command)
            .output()
            .await
            .map_err(|e| {
                MonitoringError::ExecutionFailure(format!("Failed to spawn {}: {}", self.shell, e))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(MonitoringError::ExecutionFailure(format!(
                "Command exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        String::from_utf8(output.stdout).map_err(|e| {
            MonitoringError::ExecutionFailure(format!("Command output is not valid UTF-8: {}", e))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_exec_captures_stdout() {
        let executor = NvidiaSmi::default();
        let out = executor.exec("printf 'a\\nb\\n'").await.unwrap();
        assert_eq!(out, "a\nb\n");
    }

    #[tokio::test]
    async fn test_exec_nonzero_exit_is_failure() {
        let executor = NvidiaSmi::default();
        let err = executor.exec("echo oops >&2; exit 3").await.unwrap_err();
        match err {
            MonitoringError::ExecutionFailure(msg) => assert!(msg.contains("oops")),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_exec_missing_shell_is_failure() {
        let executor = NvidiaSmi::new(Some("/nonexistent/shell".to_string()));
        assert!(matches!(
            executor.exec("true").await,
            Err(MonitoringError::ExecutionFailure(_))
        ));
    }
}
