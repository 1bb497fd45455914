//! Phase durations, input coercion and countdown arithmetic

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::time::Instant;

use super::Phase;

const NANOS_PER_SEC: u128 = 1_000_000_000;

/// Length of one phase in whole seconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PhaseDuration(u64);

impl PhaseDuration {
    pub const fn from_secs(seconds: u64) -> Self {
        Self(seconds)
    }

    /// Build from a (minutes, seconds) pair, clamping negatives to zero.
    /// Seconds may exceed 59.
    pub fn from_parts(minutes: i64, seconds: i64) -> Self {
        let minutes = minutes.max(0) as u64;
        let seconds = seconds.max(0) as u64;
        Self(minutes.saturating_mul(60).saturating_add(seconds))
    }

    /// Build from loosely typed JSON fields; anything unusable counts as zero
    pub fn from_json(minutes: Option<&Value>, seconds: Option<&Value>) -> Self {
        Self::from_parts(coerce_json(minutes), coerce_json(seconds))
    }

    pub fn as_secs(&self) -> u64 {
        self.0
    }

}

/// Configured lengths of both phases
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseDurations {
    pub work: PhaseDuration,
    #[serde(rename = "break")]
    pub rest: PhaseDuration,
}

impl PhaseDurations {
    pub fn new(work: PhaseDuration, rest: PhaseDuration) -> Self {
        Self { work, rest }
    }

    pub fn for_phase(&self, phase: Phase) -> PhaseDuration {
        match phase {
            Phase::Work => self.work,
            Phase::Break => self.rest,
        }
    }
}

impl Default for PhaseDurations {
    /// 25:00 of work followed by 5:00 of break
    fn default() -> Self {
        Self {
            work: PhaseDuration::from_secs(25 * 60),
            rest: PhaseDuration::from_secs(5 * 60),
        }
    }
}

/// Whole seconds left until `deadline`, rounded to nearest (half rounds up),
/// zero once the deadline has passed
pub fn seconds_until(deadline: Instant, now: Instant) -> u64 {
    let nanos = deadline.saturating_duration_since(now).as_nanos();
    let rounded = (nanos + NANOS_PER_SEC / 2) / NANOS_PER_SEC;
    u64::try_from(rounded).unwrap_or(u64::MAX)
}

/// Render seconds as `MM:SS`; minutes grow past two digits when needed
pub fn format_clock(seconds: u64) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

/// Parse the leading integer of `input`, ignoring anything after it.
/// Returns 0 when there are no leading digits.
fn parse_leading_int(input: &str) -> i64 {
    let trimmed = input.trim_start();
    let (negative, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let mut value: i64 = 0;
    for digit in rest.bytes().take_while(u8::is_ascii_digit) {
        value = value
            .saturating_mul(10)
            .saturating_add(i64::from(digit - b'0'));
    }

    if negative { -value } else { value }
}

fn coerce_json(value: Option<&Value>) -> i64 {
    match value {
        Some(Value::Number(n)) => match n.as_i64() {
            Some(i) => i,
            // Fractions truncate, huge values saturate
            None => n.as_f64().map(|f| f.trunc() as i64).unwrap_or(0),
        },
        Some(Value::String(s)) => parse_leading_int(s),
        _ => 0,
    }
}
