//! Alertify - a drift-corrected work/break interval timer
//!
//! The countdown is always measured against an absolute deadline, so
//! scheduling jitter never accumulates. Phase boundaries play an alert and
//! raise a desktop notification, and a repeating alarm sounds through each
//! break until it is muted.

pub mod api;
pub mod config;
pub mod error;
pub mod services;
pub mod state;
pub mod tasks;
pub mod timer;
pub mod utils;

// Re-export commonly used types
pub use api::create_router;
pub use config::Config;
pub use error::TimerError;
pub use state::{AppState, TimerSnapshot};
pub use timer::{Phase, PhaseDuration, PhaseDurations, PhaseTimer, TimerDeps};
pub use utils::signals::shutdown_signal;
