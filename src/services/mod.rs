//! Side-effect services module
//!
//! Concrete alert players and notifiers, plus the guarded call sites the
//! timer uses so a failing effect can never reach timer state.

pub mod alert;
pub mod notifier;

use std::panic::{catch_unwind, AssertUnwindSafe};
use tracing::{debug, warn};

use crate::timer::Notice;

// Re-export main types
pub use alert::{AlertPlayer, CommandAlert, TerminalBell};
pub use notifier::{DesktopNotifier, DisabledNotifier, Notifier, Permission};

/// Play one alert, logging and swallowing any failure
pub fn fire_alert(player: &dyn AlertPlayer) {
    match catch_unwind(AssertUnwindSafe(|| player.play_alert())) {
        Ok(Ok(())) => debug!("Alert played"),
        Ok(Err(e)) => warn!("Alert player failed: {:#}", e),
        Err(_) => warn!("Alert player panicked"),
    }
}

/// Raise one notification, logging and swallowing any failure
pub fn fire_notice(notifier: &dyn Notifier, notice: &Notice) {
    match catch_unwind(AssertUnwindSafe(|| notifier.notify(&notice.title, &notice.body))) {
        Ok(Ok(())) => debug!("Notification sent: {}", notice.title),
        Ok(Err(e)) => warn!("Notifier failed: {:#}", e),
        Err(_) => warn!("Notifier panicked"),
    }
}
