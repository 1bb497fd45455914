//! HTTP endpoint handlers

use std::{convert::Infallible, sync::Arc};
use axum::{
    extract::State,
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        Json,
    },
};
use chrono::Utc;
use futures::stream::{self, Stream};
use tracing::{info, warn};

use crate::{error::TimerError, state::AppState};
use super::responses::{
    ApiResponse, DurationsRequest, HealthResponse, PermissionResponse, StatusResponse,
};

/// Handle POST /start - Begin or resume the countdown
pub async fn start_handler(State(state): State<Arc<AppState>>) -> Json<ApiResponse> {
    let timer = state.apply("start", |t| t.start());
    info!("Start endpoint called - {} phase running", timer.phase);
    Json(ApiResponse::from_snapshot(
        format!("{} phase running", timer.phase),
        timer,
    ))
}

/// Handle POST /pause - Freeze the countdown
pub async fn pause_handler(State(state): State<Arc<AppState>>) -> Json<ApiResponse> {
    let timer = state.apply("pause", |t| t.pause());
    info!("Pause endpoint called - paused at {}", timer.display);
    Json(ApiResponse::from_snapshot(
        format!("Paused at {}", timer.display),
        timer,
    ))
}

/// Handle POST /stop - Halt and reset to a fresh work phase
pub async fn stop_handler(State(state): State<Arc<AppState>>) -> Json<ApiResponse> {
    let timer = state.apply("stop", |t| t.stop());
    info!("Stop endpoint called - timer reset");
    Json(ApiResponse::from_snapshot("Timer reset".to_string(), timer))
}

/// Handle POST /skip - End the current phase immediately
pub async fn skip_handler(State(state): State<Arc<AppState>>) -> Json<ApiResponse> {
    let timer = state.apply("skip", |t| t.skip());
    info!("Skip endpoint called - now in {} phase", timer.phase);
    Json(ApiResponse::from_snapshot(
        format!("Skipped to {} phase", timer.phase),
        timer,
    ))
}

/// Handle POST /mute - Toggle the break alarm
pub async fn mute_handler(State(state): State<Arc<AppState>>) -> Json<ApiResponse> {
    let timer = state.apply("mute", |t| t.toggle_mute());
    let message = if timer.muted { "Alarm muted" } else { "Alarm unmuted" };
    info!("Mute endpoint called - {}", message);
    Json(ApiResponse::from_snapshot(message.to_string(), timer))
}

/// Handle PUT /durations - Replace both phase durations
pub async fn durations_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<DurationsRequest>,
) -> Result<Json<ApiResponse>, (StatusCode, Json<ApiResponse>)> {
    let durations = request.durations();

    match state.apply("durations", |t| t.configure(durations)) {
        Ok(timer) => {
            info!(
                "Durations endpoint called - work {}, break {}",
                durations.work.as_secs(),
                durations.rest.as_secs()
            );
            Ok(Json(ApiResponse::from_snapshot(
                "Durations updated".to_string(),
                timer,
            )))
        }
        Err(e @ TimerError::ConfigureWhileRunning) => {
            warn!("Rejected durations update: {}", e);
            Err((
                StatusCode::CONFLICT,
                Json(ApiResponse::error(e.to_string(), state.timer.snapshot())),
            ))
        }
    }
}

/// Handle POST /notifications/permission - Ask for notification permission
pub async fn permission_handler(State(state): State<Arc<AppState>>) -> Json<PermissionResponse> {
    state.record_action("notifications");
    let permission = state.timer.request_notification_permission().await;
    info!("Permission endpoint called - {:?}", permission);
    Json(PermissionResponse {
        permission,
        timestamp: Utc::now(),
    })
}

/// Handle GET /status - Return current timer status
pub async fn status_handler(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    let (last_action, last_action_time) = state.get_last_action();

    Json(StatusResponse {
        timer: state.timer.snapshot(),
        alarm_armed: state.timer.alarm_armed(),
        uptime: state.get_uptime(),
        port: state.port,
        host: state.host.clone(),
        last_action,
        last_action_time,
    })
}

/// Handle GET /events - Stream every published snapshot as server-sent events
pub async fn events_handler(
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let mut updates = state.timer.subscribe();
    // The current value goes out first
    updates.mark_changed();

    let stream = stream::unfold(updates, |mut updates| async move {
        updates.changed().await.ok()?;
        let snapshot = updates.borrow_and_update().clone();
        let event = Event::default()
            .event("timer")
            .json_data(&snapshot)
            .unwrap_or_else(|e| {
                warn!("Failed to encode snapshot event: {}", e);
                Event::default().event("error")
            });
        Some((Ok(event), updates))
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
