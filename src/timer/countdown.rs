//! Countdown state machine
//!
//! `TimerCore` holds every piece of timer state and is a plain synchronous
//! value: each operation takes the current instant as an argument, so the
//! whole machine can be driven deterministically. Scheduling wake-ups and
//! firing effects belong to [`super::PhaseTimer`].
//!
//! While running, remaining time is never decremented. It is always
//! re-derived from the captured deadline, so late or missed wake-ups
//! correct themselves on the next one.

use std::time::Duration;
use tokio::time::Instant;

use super::{
    duration::{seconds_until, PhaseDuration, PhaseDurations},
    Phase,
};
use crate::{
    error::{Result, TimerError},
    state::TimerSnapshot,
};

/// Spacing between scheduled wake-ups
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// What a wake-up observed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Not running, nothing to do
    Idle,
    /// Same whole second as last time; nothing to publish
    Unchanged,
    /// Remaining time dropped to the given value
    Updated(u64),
    /// Remaining time reached zero; the phase must end
    Expired,
}

#[derive(Debug, Clone)]
pub struct TimerCore {
    durations: PhaseDurations,
    phase: Phase,
    running: bool,
    remaining_seconds: u64,
    deadline: Option<Instant>,
    next_wake: Option<Instant>,
    muted: bool,
}

impl TimerCore {
    pub fn new(durations: PhaseDurations) -> Self {
        Self {
            durations,
            phase: Phase::Work,
            running: false,
            remaining_seconds: durations.work.as_secs(),
            deadline: None,
            next_wake: None,
            muted: false,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    pub fn remaining_seconds(&self) -> u64 {
        self.remaining_seconds
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn next_wake(&self) -> Option<Instant> {
        self.next_wake
    }

    pub fn durations(&self) -> PhaseDurations {
        self.durations
    }

    /// Whether the repeating alarm should currently be sounding
    pub fn alarm_wanted(&self) -> bool {
        self.phase == Phase::Break && self.running && !self.muted
    }

    /// Replace both durations and republish the active phase's length
    pub fn configure(&mut self, durations: PhaseDurations) -> Result<()> {
        if self.running {
            return Err(TimerError::ConfigureWhileRunning);
        }
        self.durations = durations;
        self.reset_remaining();
        Ok(())
    }

    /// Capture a deadline and begin counting down.
    /// Returns false if the timer was already running.
    pub fn start(&mut self, now: Instant) -> bool {
        if self.running {
            return false;
        }
        self.running = true;
        self.capture_deadline(now);
        true
    }

    /// Freeze the countdown at its last published value
    pub fn pause(&mut self) -> bool {
        let was_running = self.running;
        self.running = false;
        self.clear_deadline();
        was_running
    }

    /// Return to the start of a work phase
    pub fn stop(&mut self) {
        self.running = false;
        self.clear_deadline();
        self.phase = Phase::Work;
        self.muted = false;
        self.reset_remaining();
    }

    /// Flip mute and return the new value
    pub fn toggle_mute(&mut self) -> bool {
        self.muted = !self.muted;
        self.muted
    }

    /// Switch to `phase` with its full duration, keeping `running` as is.
    /// A running timer gets a fresh deadline measured from `now`.
    pub fn enter_phase(&mut self, phase: Phase, now: Instant) {
        self.phase = phase;
        self.reset_remaining();
        if self.running {
            self.capture_deadline(now);
        }
        if phase == Phase::Work {
            self.muted = false;
        }
    }

    /// Handle a wake-up at `now`.
    ///
    /// The next wake-up is placed on the grid started at the deadline
    /// capture: one period after the previous scheduled wake-up, skipping
    /// any slots that already passed.
    pub fn tick(&mut self, now: Instant) -> TickOutcome {
        let Some(deadline) = self.deadline.filter(|_| self.running) else {
            return TickOutcome::Idle;
        };

        let remaining = seconds_until(deadline, now);
        let changed = remaining != self.remaining_seconds;
        self.remaining_seconds = remaining;

        if remaining == 0 {
            self.next_wake = None;
            return TickOutcome::Expired;
        }

        let scheduled = self.next_wake.unwrap_or(now);
        self.next_wake = Some(next_slot(scheduled, now));

        if changed {
            TickOutcome::Updated(remaining)
        } else {
            TickOutcome::Unchanged
        }
    }

    /// Whether a running countdown has already reached zero at `now`
    pub fn is_expired(&self, now: Instant) -> bool {
        self.running && derive_remaining(self, now) == 0
    }

    /// Re-derive the published value from the rest of the state
    pub fn refresh(&mut self, now: Instant) {
        self.remaining_seconds = derive_remaining(self, now);
    }

    pub fn snapshot(&self) -> TimerSnapshot {
        TimerSnapshot::new(
            self.phase,
            self.running,
            self.remaining_seconds,
            self.muted,
            self.durations,
        )
    }

    fn capture_deadline(&mut self, now: Instant) {
        self.deadline = Some(now + Duration::from_secs(self.remaining_seconds));
        self.next_wake = Some(now + TICK_PERIOD);
    }

    fn clear_deadline(&mut self) {
        self.deadline = None;
        self.next_wake = None;
    }

    fn reset_remaining(&mut self) {
        self.remaining_seconds = self.active_duration().as_secs();
    }

    fn active_duration(&self) -> PhaseDuration {
        self.durations.for_phase(self.phase)
    }
}

impl Default for TimerCore {
    fn default() -> Self {
        Self::new(PhaseDurations::default())
    }
}

/// Remaining seconds implied by the state at `now`: measured against the
/// deadline while running, otherwise the frozen published value
pub fn derive_remaining(core: &TimerCore, now: Instant) -> u64 {
    match (core.running, core.deadline) {
        (true, Some(deadline)) => seconds_until(deadline, now),
        _ => core.remaining_seconds,
    }
}

fn next_slot(scheduled: Instant, now: Instant) -> Instant {
    let next = scheduled + TICK_PERIOD;
    if next > now {
        return next;
    }
    let behind = now.duration_since(next).as_nanos() / TICK_PERIOD.as_nanos();
    let skipped = u32::try_from(behind + 1).unwrap_or(u32::MAX);
    next + TICK_PERIOD * skipped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::{Clock, ManualClock};

    fn secs(n: u64) -> PhaseDuration {
        PhaseDuration::from_secs(n)
    }

    #[test]
    fn starts_idle_in_work_with_defaults() {
        let core = TimerCore::default();
        assert_eq!(core.phase(), Phase::Work);
        assert!(!core.is_running());
        assert_eq!(core.remaining_seconds(), 1500);
        assert!(core.deadline().is_none());
    }

    #[test]
    fn configure_sets_remaining_for_active_phase() {
        let mut core = TimerCore::default();
        for (w, b) in [(0, 0), (1, 7), (90, 3600), (1500, 300)] {
            core.configure(PhaseDurations::new(secs(w), secs(b))).unwrap();
            assert_eq!(core.remaining_seconds(), w);
        }

        core.enter_phase(Phase::Break, Instant::now());
        core.configure(PhaseDurations::new(secs(10), secs(42))).unwrap();
        assert_eq!(core.remaining_seconds(), 42);
    }

    #[test]
    fn configure_rejected_while_running() {
        let mut core = TimerCore::default();
        core.start(Instant::now());
        let err = core.configure(PhaseDurations::default()).unwrap_err();
        assert_eq!(err, TimerError::ConfigureWhileRunning);
    }

    #[test]
    fn second_start_keeps_deadline() {
        let clock = ManualClock::new();
        let mut core = TimerCore::default();
        assert!(core.start(clock.now()));
        let deadline = core.deadline();

        clock.advance_millis(3_000);
        assert!(!core.start(clock.now()));
        assert_eq!(core.deadline(), deadline);
    }

    #[test]
    fn pause_freezes_remaining_and_clears_deadline() {
        let clock = ManualClock::new();
        let mut core = TimerCore::new(PhaseDurations::new(secs(60), secs(30)));
        core.start(clock.now());

        clock.advance_millis(10_000);
        assert_eq!(core.tick(clock.now()), TickOutcome::Updated(50));

        assert!(core.pause());
        assert!(core.deadline().is_none());
        assert_eq!(core.remaining_seconds(), 50);
        assert_eq!(core.phase(), Phase::Work);

        // Time passing while paused changes nothing
        clock.advance_millis(20_000);
        assert_eq!(core.tick(clock.now()), TickOutcome::Idle);
        assert_eq!(derive_remaining(&core, clock.now()), 50);

        // Resuming measures from the frozen value
        core.start(clock.now());
        assert_eq!(core.deadline(), Some(clock.now() + Duration::from_secs(50)));
    }

    #[test]
    fn remaining_tracks_deadline_through_irregular_gaps() {
        let clock = ManualClock::new();
        let mut core = TimerCore::new(PhaseDurations::new(secs(10), secs(5)));
        core.start(clock.now());
        let deadline = core.deadline().unwrap();

        for gap in [900, 1_100, 950, 1_300, 700, 1_000, 2_400, 450] {
            clock.advance_millis(gap);
            let now = clock.now();
            core.tick(now);
            assert_eq!(core.remaining_seconds(), seconds_until(deadline, now));
            assert_eq!(derive_remaining(&core, now), core.remaining_seconds());
        }
    }

    #[test]
    fn unchanged_second_publishes_nothing_but_keeps_schedule() {
        let clock = ManualClock::new();
        let mut core = TimerCore::new(PhaseDurations::new(secs(5), secs(5)));
        let t0 = clock.now();
        core.start(t0);
        assert_eq!(core.next_wake(), Some(t0 + TICK_PERIOD));

        // Woken early, still rounds to 5
        clock.advance_millis(300);
        assert_eq!(core.tick(clock.now()), TickOutcome::Unchanged);
        assert_eq!(core.next_wake(), Some(t0 + TICK_PERIOD * 2));

        clock.advance_millis(1_000);
        assert_eq!(core.tick(clock.now()), TickOutcome::Updated(4));
        assert_eq!(core.next_wake(), Some(t0 + TICK_PERIOD * 3));
    }

    #[test]
    fn late_wake_stays_on_grid() {
        let clock = ManualClock::new();
        let mut core = TimerCore::new(PhaseDurations::new(secs(30), secs(5)));
        let t0 = clock.now();
        core.start(t0);

        // Woken 3.4s late for the 1s slot
        clock.advance_millis(4_400);
        assert_eq!(core.tick(clock.now()), TickOutcome::Updated(26));
        assert_eq!(core.next_wake(), Some(t0 + TICK_PERIOD * 5));
    }

    #[test]
    fn expiry_stops_scheduling() {
        let clock = ManualClock::new();
        let mut core = TimerCore::new(PhaseDurations::new(secs(2), secs(5)));
        core.start(clock.now());

        clock.advance_millis(1_000);
        assert_eq!(core.tick(clock.now()), TickOutcome::Updated(1));
        clock.advance_millis(1_000);
        assert_eq!(core.tick(clock.now()), TickOutcome::Expired);
        assert_eq!(core.remaining_seconds(), 0);
        assert!(core.next_wake().is_none());
        // Phase only changes when the owner performs the transition
        assert_eq!(core.phase(), Phase::Work);
    }

    #[test]
    fn expiry_is_seen_before_the_wake_up() {
        let clock = ManualClock::new();
        let mut core = TimerCore::new(PhaseDurations::new(secs(3), secs(5)));
        assert!(!core.is_expired(clock.now()));

        core.start(clock.now());
        clock.advance_millis(2_400);
        assert!(!core.is_expired(clock.now()));
        clock.advance_millis(200);
        assert!(core.is_expired(clock.now()));

        core.pause();
        assert!(!core.is_expired(clock.now()));
    }

    #[test]
    fn empty_phase_is_expired_as_soon_as_it_starts() {
        let clock = ManualClock::new();
        let mut core = TimerCore::new(PhaseDurations::new(secs(0), secs(30)));
        core.start(clock.now());
        assert!(core.is_expired(clock.now()));
    }

    #[test]
    fn entering_phase_while_running_rebases_deadline() {
        let clock = ManualClock::new();
        let mut core = TimerCore::new(PhaseDurations::new(secs(300), secs(60)));
        core.start(clock.now());
        clock.advance_millis(12_345);

        core.enter_phase(Phase::Break, clock.now());
        assert_eq!(core.phase(), Phase::Break);
        assert_eq!(core.remaining_seconds(), 60);
        assert_eq!(core.deadline(), Some(clock.now() + Duration::from_secs(60)));
        assert!(core.alarm_wanted());
    }

    #[test]
    fn entering_phase_while_paused_uses_full_duration() {
        let mut core = TimerCore::new(PhaseDurations::new(secs(300), secs(60)));
        core.enter_phase(Phase::Break, Instant::now());
        assert_eq!(core.remaining_seconds(), 60);
        assert!(core.deadline().is_none());
        assert!(!core.alarm_wanted());
    }

    #[test]
    fn entering_work_clears_mute() {
        let mut core = TimerCore::default();
        core.enter_phase(Phase::Break, Instant::now());
        assert!(core.toggle_mute());
        core.enter_phase(Phase::Work, Instant::now());
        assert!(!core.is_muted());

        // Mute toggled during work is also dropped on the next entry
        core.toggle_mute();
        core.enter_phase(Phase::Work, Instant::now());
        assert!(!core.is_muted());
    }

    #[test]
    fn stop_resets_everything() {
        let clock = ManualClock::new();
        let mut core = TimerCore::new(PhaseDurations::new(secs(120), secs(30)));
        core.start(clock.now());
        core.enter_phase(Phase::Break, clock.now());
        core.toggle_mute();
        clock.advance_millis(5_000);
        core.tick(clock.now());

        core.stop();
        let snap = core.snapshot();
        assert_eq!(snap.phase, Phase::Work);
        assert!(!snap.running);
        assert_eq!(snap.remaining_seconds, 120);
        assert!(!snap.muted);
        assert!(core.deadline().is_none());
    }

    #[test]
    fn alarm_condition_needs_all_three_inputs() {
        let mut core = TimerCore::default();
        assert!(!core.alarm_wanted());
        core.start(Instant::now());
        assert!(!core.alarm_wanted());
        core.enter_phase(Phase::Break, Instant::now());
        assert!(core.alarm_wanted());
        core.toggle_mute();
        assert!(!core.alarm_wanted());
        core.toggle_mute();
        core.pause();
        assert!(!core.alarm_wanted());
    }
}
