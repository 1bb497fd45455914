//! Error types for the timer library

use thiserror::Error;

/// Errors returned by timer operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TimerError {
    /// Durations can only be edited while the countdown is stopped or paused
    #[error("durations cannot be changed while the timer is running")]
    ConfigureWhileRunning,
}

pub type Result<T> = std::result::Result<T, TimerError>;
