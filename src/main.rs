use std::sync::Arc;

use tracing::{info, Level};

use repwatch::capture::synthetic::SyntheticBackend;
use repwatch::config::Configuration;
use repwatch::error::AppError;
use repwatch::http::{self, AppState};
use repwatch::notify::NotificationHub;
use repwatch::session::store::CounterStore;
use repwatch::session::SessionController;

fn init_logging() {
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    init_logging();
    let configuration = Configuration::load()?;

    let backend = Arc::new(SyntheticBackend::from_config(&configuration));
    let store = CounterStore::new();
    let hub = NotificationHub::new(configuration.event_channel_capacity);
    let controller = Arc::new(SessionController::new(
        backend,
        store.clone(),
        hub.clone(),
        &configuration,
    ));

    let state = AppState {
        controller: Arc::clone(&controller),
        store,
        hub,
        default_exercise: configuration.default_exercise,
    };
    let app = http::router(state);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", configuration.http_port)).await?;
    info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(controller))
        .await?;
    Ok(())
}

/// Ctrl-C stops every running session before the server exits, so devices
/// are released and final counts are snapshotted.
async fn shutdown_signal(controller: Arc<SessionController>) {
    let _ = tokio::signal::ctrl_c().await;
    info!("shutdown requested, stopping sessions");
    controller.shutdown();
}
