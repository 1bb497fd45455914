//! Configuration and CLI argument handling

use std::{sync::Arc, time::Duration};
use clap::Parser;

use crate::{
    services::{
        AlertPlayer, CommandAlert, DesktopNotifier, DisabledNotifier, Notifier, TerminalBell,
    },
    timer::{PhaseDuration, PhaseDurations, TimerDeps},
};

/// CLI argument parsing structure
#[derive(Parser, Debug, Clone)]
#[command(name = "alertify")]
#[command(about = "A work/break interval timer with alarms and desktop notifications")]
#[command(version)]
pub struct Config {
    /// Port to bind the control server to
    #[arg(short, long, default_value = "20554")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Work phase length, minutes part
    #[arg(long, default_value = "25", allow_hyphen_values = true)]
    pub work_minutes: i64,

    /// Work phase length, seconds part
    #[arg(long, default_value = "0", allow_hyphen_values = true)]
    pub work_seconds: i64,

    /// Break phase length, minutes part
    #[arg(long, default_value = "5", allow_hyphen_values = true)]
    pub break_minutes: i64,

    /// Break phase length, seconds part
    #[arg(long, default_value = "0", allow_hyphen_values = true)]
    pub break_seconds: i64,

    /// Milliseconds between repeated alarms during a break
    #[arg(long, default_value = "1500")]
    pub alarm_interval_ms: u64,

    /// Shell command to play an alert sound (defaults to the terminal bell)
    #[arg(long)]
    pub alert_command: Option<String>,

    /// Never send desktop notifications
    #[arg(long)]
    pub no_notifications: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Get the server address as a formatted string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }

    /// Configured phase lengths; negative parts count as zero
    pub fn durations(&self) -> PhaseDurations {
        PhaseDurations::new(
            PhaseDuration::from_parts(self.work_minutes, self.work_seconds),
            PhaseDuration::from_parts(self.break_minutes, self.break_seconds),
        )
    }

    pub fn alarm_period(&self) -> Duration {
        Duration::from_millis(self.alarm_interval_ms.max(1))
    }

    pub fn alert_player(&self) -> Arc<dyn AlertPlayer> {
        match &self.alert_command {
            Some(command) => Arc::new(CommandAlert::new(command.clone())),
            None => Arc::new(TerminalBell),
        }
    }

    pub fn notifier(&self) -> Arc<dyn Notifier> {
        if self.no_notifications {
            Arc::new(DisabledNotifier)
        } else {
            Arc::new(DesktopNotifier::default())
        }
    }

    /// Everything needed to build the session's timer
    pub fn timer_deps(&self) -> TimerDeps {
        TimerDeps::new(self.alert_player(), self.notifier())
            .with_durations(self.durations())
            .with_alarm_period(self.alarm_period())
    }
}
