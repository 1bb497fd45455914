//! Repeating break alarm

use std::{
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::Duration,
};
use tokio::{
    task::AbortHandle,
    time::{interval_at, Instant, MissedTickBehavior},
};
use tracing::{debug, info};

use crate::services::{fire_alert, AlertPlayer};

/// Cadence of the break alarm
pub const DEFAULT_ALARM_PERIOD: Duration = Duration::from_millis(1500);

/// Two-state machine (armed / disarmed) that plays an alert on a fixed
/// period while armed.
///
/// Callers never arm or disarm directly; they feed the current condition to
/// [`AlarmSignaler::sync`] after every state change.
#[derive(Debug)]
pub struct AlarmSignaler {
    player: Arc<dyn AlertPlayer>,
    period: Duration,
    /// Bumped on every arm and disarm; a repeat only fires for the epoch it was armed in
    epoch: Arc<AtomicU64>,
    task: Option<AbortHandle>,
}

impl AlarmSignaler {
    pub fn new(player: Arc<dyn AlertPlayer>, period: Duration) -> Self {
        Self {
            player,
            period,
            epoch: Arc::new(AtomicU64::new(0)),
            task: None,
        }
    }

    pub fn is_armed(&self) -> bool {
        self.task.is_some()
    }

    /// Arm when `should_sound` holds, disarm otherwise. No-op when the
    /// signaler is already in the requested state.
    pub fn sync(&mut self, should_sound: bool) {
        match (should_sound, self.is_armed()) {
            (true, false) => self.arm(),
            (false, true) => self.disarm(),
            _ => {}
        }
    }

    fn arm(&mut self) {
        let epoch = self.epoch.fetch_add(1, Ordering::SeqCst) + 1;
        info!("Arming break alarm every {}ms", self.period.as_millis());

        let handle = tokio::spawn(alarm_task(
            Arc::clone(&self.player),
            self.period,
            Arc::clone(&self.epoch),
            epoch,
        ));
        self.task = Some(handle.abort_handle());
    }

    fn disarm(&mut self) {
        self.epoch.fetch_add(1, Ordering::SeqCst);
        if let Some(task) = self.task.take() {
            task.abort();
            info!("Break alarm disarmed");
        }
    }
}

impl Drop for AlarmSignaler {
    fn drop(&mut self) {
        self.disarm();
    }
}

async fn alarm_task(
    player: Arc<dyn AlertPlayer>,
    period: Duration,
    current_epoch: Arc<AtomicU64>,
    epoch: u64,
) {
    // First repeat lands one full period after arming
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        if current_epoch.load(Ordering::SeqCst) != epoch {
            debug!("Alarm epoch {} retired, stopping", epoch);
            break;
        }
        fire_alert(player.as_ref());
    }
}
