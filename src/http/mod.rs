mod routes;

use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::exercise::ExerciseKind;
use crate::notify::NotificationHub;
use crate::session::store::CounterStore;
use crate::session::SessionController;

/// Shared state backing the HTTP handlers. Handlers only ever touch the
/// controller and the store; the frame loops stay out of reach.
#[derive(Clone)]
pub struct AppState {
    pub controller: Arc<SessionController>,
    pub store: CounterStore,
    pub hub: NotificationHub,
    pub default_exercise: ExerciseKind,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/start-counting", get(routes::start_default))
        .route("/start-counting/:exercise", get(routes::start_exercise))
        .route("/stop-counting", get(routes::stop_default))
        .route("/stop-counting/:exercise", get(routes::stop_exercise))
        .route("/last-session", get(routes::last_session))
        .route("/video_feed", get(routes::video_feed_default))
        .route("/video_feed/:exercise", get(routes::video_feed_exercise))
        .route("/events", get(routes::events))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
