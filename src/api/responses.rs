//! API request and response structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    services::Permission,
    state::TimerSnapshot,
    timer::{PhaseDuration, PhaseDurations},
};

/// API response structure for timer command endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub timer: TimerSnapshot,
}

impl ApiResponse {
    /// Create a new API response
    pub fn new(status: String, message: String, timer: TimerSnapshot) -> Self {
        Self {
            status,
            message,
            timestamp: Utc::now(),
            timer,
        }
    }

    /// Response whose status reflects whether the timer is running
    pub fn from_snapshot(message: String, timer: TimerSnapshot) -> Self {
        let status = if timer.running { "running" } else { "halted" };
        Self::new(status.to_string(), message, timer)
    }

    /// Create an error response
    pub fn error(message: String, timer: TimerSnapshot) -> Self {
        Self::new("error".to_string(), message, timer)
    }
}

/// Body of PUT /durations. Each field may be a number, a string, or absent;
/// anything unusable counts as zero.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DurationsRequest {
    #[serde(default)]
    pub work_minutes: Option<Value>,
    #[serde(default)]
    pub work_seconds: Option<Value>,
    #[serde(default)]
    pub break_minutes: Option<Value>,
    #[serde(default)]
    pub break_seconds: Option<Value>,
}

impl DurationsRequest {
    pub fn durations(&self) -> PhaseDurations {
        PhaseDurations::new(
            PhaseDuration::from_json(self.work_minutes.as_ref(), self.work_seconds.as_ref()),
            PhaseDuration::from_json(self.break_minutes.as_ref(), self.break_seconds.as_ref()),
        )
    }
}

/// Result of a notification permission request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PermissionResponse {
    pub permission: Permission,
    pub timestamp: DateTime<Utc>,
}

/// Status response with server metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub timer: TimerSnapshot,
    pub alarm_armed: bool,
    pub uptime: String,
    pub port: u16,
    pub host: String,
    pub last_action: Option<String>,
    pub last_action_time: Option<DateTime<Utc>>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

impl HealthResponse {
    /// Create a new health response
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
