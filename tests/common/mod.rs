//! Recording fakes for the timer's collaborators

#![allow(dead_code)]

use std::{
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

use alertify::{
    services::{AlertPlayer, Notifier, Permission},
    timer::{PhaseDuration, PhaseDurations, PhaseTimer, TimerDeps},
};
use futures::future::{self, BoxFuture, FutureExt};

#[derive(Debug, Default)]
pub struct RecordingAlert {
    plays: AtomicUsize,
}

impl RecordingAlert {
    pub fn plays(&self) -> usize {
        self.plays.load(Ordering::SeqCst)
    }
}

impl AlertPlayer for RecordingAlert {
    fn play_alert(&self) -> anyhow::Result<()> {
        self.plays.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct FailingAlert {
    attempts: AtomicUsize,
}

impl FailingAlert {
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

impl AlertPlayer for FailingAlert {
    fn play_alert(&self) -> anyhow::Result<()> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        anyhow::bail!("no audio device")
    }
}

#[derive(Debug)]
pub struct RecordingNotifier {
    answer: Permission,
    sent: Mutex<Vec<(String, String)>>,
    requests: AtomicUsize,
    panic_on_notify: bool,
}

impl RecordingNotifier {
    pub fn granting() -> Self {
        Self::answering(Permission::Granted)
    }

    pub fn denying() -> Self {
        Self::answering(Permission::Denied)
    }

    pub fn answering(answer: Permission) -> Self {
        Self {
            answer,
            sent: Mutex::new(Vec::new()),
            requests: AtomicUsize::new(0),
            panic_on_notify: false,
        }
    }

    /// Granted permission, but every notify call panics
    pub fn panicking() -> Self {
        Self {
            panic_on_notify: true,
            ..Self::granting()
        }
    }

    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }

    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, title: &str, body: &str) -> anyhow::Result<()> {
        if self.panic_on_notify {
            panic!("notification daemon crashed");
        }
        self.sent
            .lock()
            .unwrap()
            .push((title.to_string(), body.to_string()));
        Ok(())
    }

    fn request_permission(&self) -> BoxFuture<'static, Permission> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        future::ready(self.answer).boxed()
    }
}

pub fn secs(work: u64, rest: u64) -> PhaseDurations {
    PhaseDurations::new(PhaseDuration::from_secs(work), PhaseDuration::from_secs(rest))
}

pub struct Harness {
    pub timer: PhaseTimer,
    pub alert: Arc<RecordingAlert>,
    pub notifier: Arc<RecordingNotifier>,
}

impl Harness {
    pub fn new(durations: PhaseDurations) -> Self {
        Self::with_notifier(durations, RecordingNotifier::granting())
    }

    pub fn with_notifier(durations: PhaseDurations, notifier: RecordingNotifier) -> Self {
        let alert = Arc::new(RecordingAlert::default());
        let notifier = Arc::new(notifier);
        let timer = PhaseTimer::new(
            TimerDeps::new(alert.clone(), notifier.clone()).with_durations(durations),
        );
        Self {
            timer,
            alert,
            notifier,
        }
    }

    /// Start and let the lazy permission request resolve
    pub async fn start(&self) {
        self.timer.start();
        let_tasks_run().await;
    }
}

/// Give spawned tasks a chance to run without moving the clock
pub async fn let_tasks_run() {
    for _ in 0..8 {
        tokio::task::yield_now().await;
    }
}

pub async fn sleep_ms(ms: u64) {
    tokio::time::sleep(Duration::from_millis(ms)).await;
}
