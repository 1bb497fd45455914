//! State management module
//!
//! Published timer snapshots and the per-server application state.

pub mod app_state;
pub mod timer_state;

// Re-export main types
pub use app_state::AppState;
pub use timer_state::TimerSnapshot;
