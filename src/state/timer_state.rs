//! Published timer state

use serde::{Deserialize, Serialize};

use crate::{
    services::Permission,
    timer::{duration::format_clock, Phase, PhaseDurations},
};

/// Read-only view of the timer, re-emitted on every change for rendering
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerSnapshot {
    pub phase: Phase,
    pub running: bool,
    pub remaining_seconds: u64,
    pub muted: bool,
    /// Remaining time as `MM:SS`
    pub display: String,
    pub durations: PhaseDurations,
    pub notification_permission: Permission,
}

impl TimerSnapshot {
    pub fn new(
        phase: Phase,
        running: bool,
        remaining_seconds: u64,
        muted: bool,
        durations: PhaseDurations,
    ) -> Self {
        Self {
            phase,
            running,
            remaining_seconds,
            muted,
            display: format_clock(remaining_seconds),
            durations,
            notification_permission: Permission::Default,
        }
    }

    pub fn with_permission(mut self, permission: Permission) -> Self {
        self.notification_permission = permission;
        self
    }

    /// True while the repeating break alarm should be audible
    pub fn alarm_sounding(&self) -> bool {
        self.phase == Phase::Break && self.running && !self.muted
    }
}

impl Default for TimerSnapshot {
    fn default() -> Self {
        let durations = PhaseDurations::default();
        Self::new(Phase::Work, false, durations.work.as_secs(), false, durations)
    }
}
