use thiserror::Error;

#[derive(Error, Debug)]
pub enum MonitoringError {
    /// The sampling command could not be run or produced nothing usable.
    #[error("Execution failure: {0}")]
    ExecutionFailure(String),
    /// A data line carried fewer columns than the fixed layout requires.
    #[error("Format violation on line {line}: expected {expected} fields, found {found}")]
    FormatViolation {
        line: usize,
        expected: usize,
        found: usize,
    },
    #[error("Invalid pid: {0}")]
    InvalidPid(String),
    #[error("Termination failure for pid {pid}: {reason}")]
    TerminationFailure { pid: String, reason: String },
    #[error("Other error: {0}")]
    Other(String),
}
