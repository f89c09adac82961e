use std::convert::Infallible;

use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use axum::Json;
use bytes::Bytes;
use futures::{Stream, StreamExt};
use serde_json::json;
use tokio::sync::broadcast::error::RecvError;
use tokio_stream::wrappers::BroadcastStream;
use tracing::warn;

use super::AppState;
use crate::exercise::ExerciseKind;

pub(super) async fn start_default(State(state): State<AppState>) -> Response {
    start(&state, state.default_exercise)
}

pub(super) async fn start_exercise(
    State(state): State<AppState>,
    Path(exercise): Path<String>,
) -> Response {
    match parse_exercise(&exercise) {
        Ok(kind) => start(&state, kind),
        Err(rejection) => rejection,
    }
}

pub(super) async fn stop_default(State(state): State<AppState>) -> Response {
    stop(&state, state.default_exercise)
}

pub(super) async fn stop_exercise(
    State(state): State<AppState>,
    Path(exercise): Path<String>,
) -> Response {
    match parse_exercise(&exercise) {
        Ok(kind) => stop(&state, kind),
        Err(rejection) => rejection,
    }
}

pub(super) async fn last_session(State(state): State<AppState>) -> Response {
    (StatusCode::OK, Json(state.store.snapshot())).into_response()
}

pub(super) async fn video_feed_default(State(state): State<AppState>) -> Response {
    video_feed(&state, state.default_exercise)
}

pub(super) async fn video_feed_exercise(
    State(state): State<AppState>,
    Path(exercise): Path<String>,
) -> Response {
    match parse_exercise(&exercise) {
        Ok(kind) => video_feed(&state, kind),
        Err(rejection) => rejection,
    }
}

/// Completed reps as Server-Sent Events, one `<slug>_count_update` event per
/// rep with the `{count, stage}` payload.
pub(super) async fn events(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let stream = BroadcastStream::new(state.hub.subscribe()).filter_map(|update| async move {
        match update {
            Ok(update) => {
                let payload = json!({"count": update.count, "stage": update.stage});
                Some(Ok(Event::default()
                    .event(update.event_name())
                    .data(payload.to_string())))
            }
            // A lagged receiver just misses updates.
            Err(_) => None,
        }
    });
    Sse::new(stream).keep_alive(KeepAlive::default())
}

/// Unknown exercise kinds are rejected before any resource is touched.
fn parse_exercise(raw: &str) -> Result<ExerciseKind, Response> {
    raw.parse::<ExerciseKind>().map_err(|err| {
        (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": err.to_string()})),
        )
            .into_response()
    })
}

fn start(state: &AppState, kind: ExerciseKind) -> Response {
    match state.controller.start(kind) {
        // Idempotent: an already running session reports success too.
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "message": format!("{} counter started", kind.display_name())
            })),
        )
            .into_response(),
        Err(err) => {
            warn!(exercise = %kind, "{err}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": format!("Failed to start {} counter", kind.display_name())
                })),
            )
                .into_response()
        }
    }
}

fn stop(state: &AppState, kind: ExerciseKind) -> Response {
    state.controller.stop(kind);
    (
        StatusCode::OK,
        Json(json!({
            "message": format!("{} counter stopped", kind.display_name())
        })),
    )
        .into_response()
}

/// Multipart stream with boundary token `frame`, one JPEG per part. An ended
/// session simply stops producing parts.
fn video_feed(state: &AppState, kind: ExerciseKind) -> Response {
    let mut frames = state.controller.subscribe_frames(kind);
    let stream = async_stream::stream! {
        loop {
            match frames.recv().await {
                Ok(jpeg) => {
                    let mut part = Vec::with_capacity(jpeg.len() + 64);
                    part.extend_from_slice(b"--frame\r\n");
                    part.extend_from_slice(b"Content-Type: image/jpeg\r\n\r\n");
                    part.extend_from_slice(&jpeg);
                    part.extend_from_slice(b"\r\n");
                    yield Ok::<Bytes, Infallible>(Bytes::from(part));
                }
                // Skip frames this consumer was too slow for.
                Err(RecvError::Lagged(_)) => continue,
                Err(RecvError::Closed) => break,
            }
        }
    };

    (
        [
            (
                header::CONTENT_TYPE,
                "multipart/x-mixed-replace; boundary=frame",
            ),
            (header::CACHE_CONTROL, "no-cache"),
        ],
        Body::from_stream(stream),
    )
        .into_response()
}
