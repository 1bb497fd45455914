//! Alertify - a work/break interval timer
//!
//! Hosts one timer session behind a small HTTP control API.

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use alertify::{
    api::create_router,
    config::Config,
    state::AppState,
    tasks::status_logger_task,
    timer::PhaseTimer,
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("alertify={},tower_http=info", config.log_level()))
        .init();

    info!("Starting alertify v{}", env!("CARGO_PKG_VERSION"));
    let durations = config.durations();
    info!(
        "Configuration: host={}, port={}, work={}s, break={}s, alarm every {}ms",
        config.host,
        config.port,
        durations.work.as_secs(),
        durations.rest.as_secs(),
        config.alarm_period().as_millis()
    );

    let timer = PhaseTimer::new(config.timer_deps());
    let state = Arc::new(AppState::new(timer.clone(), config.port, config.host.clone()));

    // Log published snapshots in the background
    tokio::spawn(status_logger_task(timer.subscribe()));

    let app = create_router(state);

    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  POST /start                    - Start or resume the countdown");
    info!("  POST /pause                    - Pause the countdown");
    info!("  POST /stop                     - Stop and reset to work");
    info!("  POST /skip                     - Skip to the next phase");
    info!("  POST /mute                     - Toggle the break alarm");
    info!("  PUT  /durations                - Set work/break durations");
    info!("  POST /notifications/permission - Request notification permission");
    info!("  GET  /status                   - Current timer status");
    info!("  GET  /events                   - Stream of timer snapshots");
    info!("  GET  /health                   - Health check");

    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!("Server error: {}", e);
            }
        }
        _ = shutdown_signal() => {
            info!("Shutdown signal received");
        }
    }

    timer.shutdown();
    info!("Server shutdown complete");
    Ok(())
}
