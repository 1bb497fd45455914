//! Drift-corrected countdown tick loop

use tokio::{
    task::AbortHandle,
    time::{sleep_until, Instant},
};
use tracing::debug;

use crate::timer::WeakPhaseTimer;

/// Handle to the one live tick loop of a timer.
///
/// The generation identifies which loop is current: a wake-up that arrives
/// carrying any other generation is stale and gets ignored, even if it
/// slipped past the abort.
#[derive(Debug)]
pub struct TickHandle {
    generation: u64,
    abort: AbortHandle,
}

impl TickHandle {
    /// Spawn a loop whose first wake-up is at `first_wake`
    pub(crate) fn spawn(timer: WeakPhaseTimer, generation: u64, first_wake: Instant) -> Self {
        let task = tokio::spawn(tick_loop(timer, generation, first_wake));
        Self {
            generation,
            abort: task.abort_handle(),
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn cancel(self) {
        debug!("Cancelling tick loop generation {}", self.generation);
        self.abort.abort();
    }
}

/// Sleep until each scheduled wake-up and hand it to the timer.
///
/// The timer answers with the next scheduled instant, which is always
/// derived from the previous scheduled instant rather than from when this
/// task actually woke up.
async fn tick_loop(timer: WeakPhaseTimer, generation: u64, first_wake: Instant) {
    let mut wake = first_wake;

    loop {
        sleep_until(wake).await;

        let Some(timer) = timer.upgrade() else {
            debug!("Timer dropped, tick loop {} exiting", generation);
            break;
        };

        match timer.on_wake(generation) {
            Some(next) => wake = next,
            None => break,
        }
    }
}
