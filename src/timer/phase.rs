//! Work/break phases and the messages raised when one ends

use std::fmt;
use serde::{Deserialize, Serialize};

/// The two alternating phases of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    #[default]
    Work,
    Break,
}

impl Phase {
    /// The phase that follows this one
    pub fn next(self) -> Self {
        match self {
            Phase::Work => Phase::Break,
            Phase::Break => Phase::Work,
        }
    }

    /// Notification raised when this phase runs out
    pub fn end_notice(self) -> Notice {
        match self {
            Phase::Work => Notice::new("Time's Up!", "Time to take a break."),
            Phase::Break => Notice::new("Break Over!", "Time to get back to work."),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Work => "work",
            Phase::Break => "break",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Title and body of a system notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub title: String,
    pub body: String,
}

impl Notice {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
        }
    }
}

/// Record of one phase boundary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub from: Phase,
    pub to: Phase,
    pub notice: Notice,
}

impl Transition {
    pub fn leaving(from: Phase) -> Self {
        Self {
            from,
            to: from.next(),
            notice: from.end_notice(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phases_alternate() {
        assert_eq!(Phase::Work.next(), Phase::Break);
        assert_eq!(Phase::Break.next(), Phase::Work);
        assert_eq!(Phase::default(), Phase::Work);
    }

    #[test]
    fn end_notices_match_the_phase_being_left() {
        let t = Transition::leaving(Phase::Work);
        assert_eq!(t.from, Phase::Work);
        assert_eq!(t.to, Phase::Break);
        assert_eq!(t.notice, Notice::new("Time's Up!", "Time to take a break."));

        let t = Transition::leaving(Phase::Break);
        assert_eq!(t.to, Phase::Work);
        assert_eq!(t.notice.title, "Break Over!");
        assert_eq!(t.notice.body, "Time to get back to work.");
    }

    #[test]
    fn serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Phase::Break).unwrap(), "\"break\"");
        assert_eq!(Phase::Work.to_string(), "work");
    }
}
