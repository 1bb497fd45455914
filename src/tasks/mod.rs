//! Background tasks module
//!
//! Scheduled work that runs alongside the timer operations: the
//! drift-corrected tick loop, the repeating break alarm, and the
//! snapshot logger used by the binary.

pub mod alarm_signaler;
pub mod status_logger;
pub mod tick_loop;

// Re-export main types and functions
pub use alarm_signaler::{AlarmSignaler, DEFAULT_ALARM_PERIOD};
pub use status_logger::status_logger_task;
pub use tick_loop::TickHandle;
