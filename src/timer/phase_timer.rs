//! Phase timer: the countdown core plus its scheduled wake-ups and effects

use std::{
    sync::{Arc, Mutex, MutexGuard, Weak},
    time::Duration,
};
use tokio::{sync::watch, time::Instant};
use tracing::{debug, info, warn};

use super::{
    clock::{Clock, TokioClock},
    countdown::{TickOutcome, TimerCore},
    duration::PhaseDurations,
    phase::Transition,
};
use crate::{
    error::Result,
    services::{fire_alert, fire_notice, AlertPlayer, Notifier, Permission},
    state::TimerSnapshot,
    tasks::{AlarmSignaler, TickHandle, DEFAULT_ALARM_PERIOD},
};

/// Collaborators and settings a [`PhaseTimer`] is built from
#[derive(Debug, Clone)]
pub struct TimerDeps {
    pub clock: Arc<dyn Clock>,
    pub alert: Arc<dyn AlertPlayer>,
    pub notifier: Arc<dyn Notifier>,
    pub durations: PhaseDurations,
    pub alarm_period: Duration,
}

impl TimerDeps {
    /// Default durations, tokio clock and the standard alarm cadence
    pub fn new(alert: Arc<dyn AlertPlayer>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            clock: Arc::new(TokioClock),
            alert,
            notifier,
            durations: PhaseDurations::default(),
            alarm_period: DEFAULT_ALARM_PERIOD,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_durations(mut self, durations: PhaseDurations) -> Self {
        self.durations = durations;
        self
    }

    pub fn with_alarm_period(mut self, period: Duration) -> Self {
        self.alarm_period = period;
        self
    }
}

#[derive(Debug)]
struct Inner {
    core: TimerCore,
    tick: Option<TickHandle>,
    generation: u64,
    alarm: AlarmSignaler,
    permission: Permission,
    permission_pending: bool,
}

#[derive(Debug)]
struct Shared {
    inner: Mutex<Inner>,
    clock: Arc<dyn Clock>,
    alert: Arc<dyn AlertPlayer>,
    notifier: Arc<dyn Notifier>,
    updates: watch::Sender<TimerSnapshot>,
}

impl Drop for Shared {
    fn drop(&mut self) {
        let inner = self.inner.get_mut().unwrap_or_else(|e| e.into_inner());
        if let Some(tick) = inner.tick.take() {
            tick.cancel();
        }
    }
}

/// Work/break interval timer.
///
/// Cheap to clone; all clones drive the same session. Every operation runs
/// under one lock, cancels any outstanding wake-up before touching the
/// deadline, and finishes by re-evaluating the alarm and publishing a
/// snapshot. Must be used from within a tokio runtime.
#[derive(Debug, Clone)]
pub struct PhaseTimer {
    shared: Arc<Shared>,
}

/// Non-owning handle held by scheduled tasks
#[derive(Debug, Clone)]
pub struct WeakPhaseTimer {
    shared: Weak<Shared>,
}

impl WeakPhaseTimer {
    pub fn upgrade(&self) -> Option<PhaseTimer> {
        self.shared.upgrade().map(|shared| PhaseTimer { shared })
    }
}

impl PhaseTimer {
    pub fn new(deps: TimerDeps) -> Self {
        let core = TimerCore::new(deps.durations);
        let (updates, _) = watch::channel(core.snapshot());

        let inner = Inner {
            core,
            tick: None,
            generation: 0,
            alarm: AlarmSignaler::new(Arc::clone(&deps.alert), deps.alarm_period),
            permission: Permission::Default,
            permission_pending: false,
        };

        Self {
            shared: Arc::new(Shared {
                inner: Mutex::new(inner),
                clock: deps.clock,
                alert: deps.alert,
                notifier: deps.notifier,
                updates,
            }),
        }
    }

    pub fn downgrade(&self) -> WeakPhaseTimer {
        WeakPhaseTimer {
            shared: Arc::downgrade(&self.shared),
        }
    }

    /// Receive every published snapshot
    pub fn subscribe(&self) -> watch::Receiver<TimerSnapshot> {
        self.shared.updates.subscribe()
    }

    pub fn snapshot(&self) -> TimerSnapshot {
        let inner = self.lock();
        Self::snapshot_of(&inner)
    }

    /// Instant the running countdown reaches zero
    pub fn deadline(&self) -> Option<Instant> {
        self.lock().core.deadline()
    }

    pub fn alarm_armed(&self) -> bool {
        self.lock().alarm.is_armed()
    }

    pub fn permission(&self) -> Permission {
        self.lock().permission
    }

    /// Replace both phase durations. Only allowed while not running.
    pub fn configure(&self, durations: PhaseDurations) -> Result<TimerSnapshot> {
        let mut inner = self.lock();
        inner.core.configure(durations)?;
        info!(
            "Durations set: work {}s, break {}s",
            durations.work.as_secs(),
            durations.rest.as_secs()
        );
        Ok(self.settle(&mut inner))
    }

    /// Begin or resume the countdown. Calling it while running changes nothing.
    pub fn start(&self) -> TimerSnapshot {
        let mut inner = self.lock();
        let now = self.shared.clock.now();

        if !inner.core.start(now) {
            debug!("Start ignored, timer already running");
            return Self::snapshot_of(&inner);
        }
        info!(
            "Timer started: {} phase, {}s remaining",
            inner.core.phase(),
            inner.core.remaining_seconds()
        );

        self.rearm_tick_loop(&mut inner);
        self.request_permission_once(&mut inner);
        self.settle_or_expire(&mut inner)
    }

    /// Freeze the countdown where it is
    pub fn pause(&self) -> TimerSnapshot {
        let mut inner = self.lock();
        Self::cancel_tick_loop(&mut inner);
        if inner.core.pause() {
            info!("Timer paused at {}s", inner.core.remaining_seconds());
        }
        self.settle(&mut inner)
    }

    /// Halt and return to a fresh work phase
    pub fn stop(&self) -> TimerSnapshot {
        let mut inner = self.lock();
        Self::cancel_tick_loop(&mut inner);
        inner.core.stop();
        info!("Timer stopped and reset");
        self.settle(&mut inner)
    }

    /// End the current phase now, as if it had run out
    pub fn skip(&self) -> TimerSnapshot {
        let mut inner = self.lock();
        Self::cancel_tick_loop(&mut inner);
        info!("Skipping {} phase", inner.core.phase());
        self.end_phase(&mut inner);
        self.settle(&mut inner)
    }

    /// Silence or restore the break alarm
    pub fn toggle_mute(&self) -> TimerSnapshot {
        let mut inner = self.lock();
        let muted = inner.core.toggle_mute();
        info!("Alarm {}", if muted { "muted" } else { "unmuted" });
        self.settle_or_expire(&mut inner)
    }

    /// Ask the notifier for permission, even if it was refused before
    pub async fn request_notification_permission(&self) -> Permission {
        let permission = self.shared.notifier.request_permission().await;
        self.record_permission(permission);
        permission
    }

    /// Cancel every pending wake-up and alarm; the session is over
    pub fn shutdown(&self) {
        let mut inner = self.lock();
        Self::cancel_tick_loop(&mut inner);
        inner.core.pause();
        inner.alarm.sync(false);
        info!("Timer shut down");
        self.publish(&inner);
    }

    /// Handle a scheduled wake-up. Returns when the loop should wake next,
    /// or `None` once the loop is finished or no longer current.
    pub(crate) fn on_wake(&self, generation: u64) -> Option<Instant> {
        let mut inner = self.lock();

        let current = inner.tick.as_ref().map(TickHandle::generation);
        if current != Some(generation) {
            debug!("Ignoring stale wake-up from tick loop {}", generation);
            return None;
        }

        let now = self.shared.clock.now();
        match inner.core.tick(now) {
            TickOutcome::Idle => {
                inner.tick = None;
                None
            }
            TickOutcome::Unchanged => inner.core.next_wake(),
            TickOutcome::Updated(remaining) => {
                debug!("{}s remaining", remaining);
                self.publish(&inner);
                inner.core.next_wake()
            }
            TickOutcome::Expired => {
                inner.tick = None;
                info!("{} phase finished", inner.core.phase());
                self.end_phase(&mut inner);
                self.settle(&mut inner);
                None
            }
        }
    }

    /// Phase-end transition: alert, notify, flip, and rebase the deadline
    fn end_phase(&self, inner: &mut Inner) {
        let transition = Transition::leaving(inner.core.phase());

        fire_alert(self.shared.alert.as_ref());
        if inner.permission == Permission::Granted {
            fire_notice(self.shared.notifier.as_ref(), &transition.notice);
        } else {
            debug!(
                "Notification '{}' not sent, permission {:?}",
                transition.notice.title, inner.permission
            );
        }

        let now = self.shared.clock.now();
        inner.core.enter_phase(transition.to, now);
        info!(
            "Left {} phase, entered {} with {}s",
            transition.from,
            transition.to,
            inner.core.remaining_seconds()
        );
        self.rearm_tick_loop(inner);
    }

    /// The one place a tick loop is (re)started: cancels the previous loop,
    /// then spawns a new generation if the timer is running
    fn rearm_tick_loop(&self, inner: &mut Inner) {
        Self::cancel_tick_loop(inner);

        let Some(first_wake) = inner.core.next_wake().filter(|_| inner.core.is_running()) else {
            return;
        };

        inner.generation += 1;
        inner.tick = Some(TickHandle::spawn(self.downgrade(), inner.generation, first_wake));
    }

    fn cancel_tick_loop(inner: &mut Inner) {
        if let Some(tick) = inner.tick.take() {
            tick.cancel();
        }
    }

    fn request_permission_once(&self, inner: &mut Inner) {
        if inner.permission != Permission::Default || inner.permission_pending {
            return;
        }
        inner.permission_pending = true;

        let request = self.shared.notifier.request_permission();
        let timer = self.downgrade();
        tokio::spawn(async move {
            let permission = request.await;
            if let Some(timer) = timer.upgrade() {
                timer.record_permission(permission);
            }
        });
    }

    fn record_permission(&self, permission: Permission) {
        let mut inner = self.lock();
        inner.permission_pending = false;
        if inner.permission != permission {
            info!("Notification permission: {:?}", permission);
            inner.permission = permission;
            self.publish(&inner);
        }
    }

    /// Tail of operations that leave a deadline in place. A countdown that
    /// already rounds to zero ends its phase here instead of waiting for the
    /// next wake-up.
    fn settle_or_expire(&self, inner: &mut Inner) -> TimerSnapshot {
        let now = self.shared.clock.now();
        if inner.core.is_expired(now) {
            Self::cancel_tick_loop(inner);
            info!("{} phase finished", inner.core.phase());
            self.end_phase(inner);
        }
        self.settle(inner)
    }

    /// Common tail of every mutating operation
    fn settle(&self, inner: &mut Inner) -> TimerSnapshot {
        let now = self.shared.clock.now();
        inner.core.refresh(now);
        let sound = inner.core.alarm_wanted();
        inner.alarm.sync(sound);
        self.publish(inner)
    }

    fn publish(&self, inner: &Inner) -> TimerSnapshot {
        let snapshot = Self::snapshot_of(inner);
        self.shared.updates.send_replace(snapshot.clone());
        snapshot
    }

    fn snapshot_of(inner: &Inner) -> TimerSnapshot {
        inner.core.snapshot().with_permission(inner.permission)
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.shared.inner.lock().unwrap_or_else(|poisoned| {
            warn!("Timer state lock was poisoned, recovering");
            poisoned.into_inner()
        })
    }
}
