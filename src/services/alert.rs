//! Audible alert players

use std::{fmt, io::Write};
use anyhow::Context;
use tokio::process::Command;
use tracing::debug;

/// Plays one short alert sound. Must return without waiting for playback.
pub trait AlertPlayer: Send + Sync + fmt::Debug {
    fn play_alert(&self) -> anyhow::Result<()>;
}

/// Rings the terminal bell on stdout
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalBell;

impl AlertPlayer for TerminalBell {
    fn play_alert(&self) -> anyhow::Result<()> {
        let mut stdout = std::io::stdout().lock();
        stdout.write_all(b"\x07").context("Failed to write terminal bell")?;
        stdout.flush().context("Failed to flush terminal bell")?;
        Ok(())
    }
}

/// Runs a shell command (e.g. `paplay /usr/share/sounds/...`) per alert.
/// The child is spawned and left to finish on its own.
#[derive(Debug, Clone)]
pub struct CommandAlert {
    command: String,
}

impl CommandAlert {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }
}

impl AlertPlayer for CommandAlert {
    fn play_alert(&self) -> anyhow::Result<()> {
        debug!("Spawning alert command: {}", self.command);

        Command::new("sh")
            .arg("-c")
            .arg(&self.command)
            .stdout(std::process::Stdio::null())
            .stderr(std::process::Stdio::null())
            .spawn()
            .with_context(|| format!("Failed to spawn alert command `{}`", self.command))?;

        Ok(())
    }
}
