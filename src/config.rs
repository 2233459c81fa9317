use crate::error::{OrderError, Result};
use clap::Args;
use std::time::Duration;

pub const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 300;
/// One week.
pub const MAX_SWEEP_INTERVAL_SECS: u64 = 7 * 24 * 60 * 60;

/// Runtime settings shared by the binary and embedders.
#[derive(Debug, Clone, PartialEq, Eq, Args)]
pub struct Settings {
    /// Seconds between reconciliation sweeps over pending orders.
    #[arg(
        long,
        env = "ORDERFLOW_SWEEP_INTERVAL_SECS",
        default_value_t = DEFAULT_SWEEP_INTERVAL_SECS
    )]
    pub sweep_interval_secs: u64,

    /// Emit logs as JSON lines instead of human-readable text.
    #[arg(long)]
    pub log_json: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            sweep_interval_secs: DEFAULT_SWEEP_INTERVAL_SECS,
            log_json: false,
        }
    }
}

impl Settings {
    pub fn sweep_interval(&self) -> Result<Duration> {
        if !(1..=MAX_SWEEP_INTERVAL_SECS).contains(&self.sweep_interval_secs) {
            return Err(OrderError::ValidationError(format!(
                "Sweep interval must be between 1 and {MAX_SWEEP_INTERVAL_SECS} seconds"
            )));
        }
        Ok(Duration::from_secs(self.sweep_interval_secs))
    }
}
