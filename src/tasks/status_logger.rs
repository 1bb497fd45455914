//! Snapshot logging background task

use tokio::sync::watch;
use tracing::{debug, info};

use crate::state::TimerSnapshot;

/// Log every published snapshot: phase and run-state changes at info,
/// countdown updates at debug
pub async fn status_logger_task(mut updates: watch::Receiver<TimerSnapshot>) {
    info!("Starting status logger task");

    let mut last = updates.borrow_and_update().clone();

    while updates.changed().await.is_ok() {
        let current = updates.borrow_and_update().clone();

        if current.phase != last.phase {
            info!("Phase changed: {} -> {} ({})", last.phase, current.phase, current.display);
        }
        if current.running != last.running {
            info!(
                "Timer {} at {}",
                if current.running { "running" } else { "halted" },
                current.display
            );
        }
        if current.muted != last.muted {
            info!("Alarm {}", if current.muted { "muted" } else { "unmuted" });
        }
        if current.alarm_sounding() != last.alarm_sounding() {
            debug!("Alarm sounding: {}", current.alarm_sounding());
        }
        debug!("{} {} remaining", current.phase, current.display);

        last = current;
    }

    debug!("Timer closed, status logger exiting");
}
