//! Sampler configuration.

use crate::utils::errors::MonitoringError;
use log::warn;
use std::time::Duration;

/// `nvidia-smi pmon` reordered into the column layout the parser expects:
/// name, type, gpu, pid, sm, mem, enc, dec, fb. pmon's two `#` banner
/// lines pass through as the header.
pub const DEFAULT_COMMAND: &str = "nvidia-smi pmon -c 1 -s um | \
awk '{ print $NF, $3, $1, $2, $4, $5, $6, $7, $(NF-1) }'";

/// Default sampling rate in Hz
pub const DEFAULT_RATE: f64 = 1.0;

pub const COMMAND_ENV: &str = "GPUMON_COMMAND";
pub const RATE_ENV: &str = "GPUMON_RATE";

#[derive(Debug, Clone, PartialEq)]
pub struct SamplerConfig {
    /// Command whose output is parsed each cycle
    pub command: String,
    /// Sampling rate in Hz, only used by a background monitor
    pub rate: f64,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            command: DEFAULT_COMMAND.to_string(),
            rate: DEFAULT_RATE,
        }
    }
}

impl SamplerConfig {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            rate: DEFAULT_RATE,
        }
    }

    pub fn with_rate(mut self, rate: f64) -> Self {
        self.rate = rate;
        self
    }

    /// Defaults overridden by `GPUMON_COMMAND` and `GPUMON_RATE`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(command) = lookup(COMMAND_ENV).filter(|c| !c.trim().is_empty()) {
            config.command = command;
        }
        if let Some(rate) = lookup(RATE_ENV) {
            match rate.trim().parse::<f64>() {
                Ok(hz) if hz.is_finite() && hz > 0.0 => config.rate = hz,
                _ => warn!("Ignoring invalid {}={:?}, keeping {} Hz", RATE_ENV, rate, config.rate),
            }
        }
        config
    }

    /// Delay between cycles. Fails unless the rate is positive and finite.
    pub fn interval(&self) -> Result<Duration, MonitoringError> {
        if !(self.rate.is_finite() && self.rate > 0.0) {
            return Err(MonitoringError::Other(format!(
                "Sampling rate must be positive, got {}",
                self.rate
            )));
        }
        Duration::try_from_secs_f64(1.0 / self.rate)
            .map_err(|e| MonitoringError::Other(format!("Invalid sampling rate {}: {}", self.rate, e)))
    }
}
