use std::io;

use crate::top::Pin;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{signal} mismatch at {time} ps (expected: {expected}, found: {found})")]
    Mismatch {
        signal: &'static str,
        expected: String,
        found: String,
        time: u64,
    },
    #[error("no clock is running, cannot wait for an edge")]
    ClockStopped,
    #[error("{pin} is driven by the running clock generator")]
    PinDriven { pin: Pin },
    #[error("simulation time overflows: {time} ps + {duration} ps")]
    TimeOverflow { time: u64, duration: u64 },
    #[error("invalid bench configuration: {field} {reason}")]
    InvalidConfig {
        field: &'static str,
        reason: &'static str,
    },
    #[error("invalid bench configuration: {0}")]
    Config(#[from] serde_json::Error),
    #[error("{0}")]
    Io(#[from] io::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
