//! Timer module
//!
//! The drift-corrected countdown engine and the work/break phase machine.

pub mod clock;
pub mod countdown;
pub mod duration;
pub mod phase;
pub mod phase_timer;

// Re-export main types
pub use clock::{Clock, ManualClock, TokioClock};
pub use countdown::{derive_remaining, TickOutcome, TimerCore, TICK_PERIOD};
pub use duration::{PhaseDuration, PhaseDurations};
pub use phase::{Notice, Phase, Transition};
pub use phase_timer::{PhaseTimer, TimerDeps, WeakPhaseTimer};
