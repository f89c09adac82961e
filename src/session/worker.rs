//! Per-session frame loop: capture, detect, count, annotate, publish.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use bytes::Bytes;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use super::SessionBackend;
use crate::annotate::{self, Hud};
use crate::exercise::angle::joint_angle;
use crate::exercise::counter::RepCounter;
use crate::exercise::ExerciseKind;
use crate::notify::{CountUpdate, NotificationHub};
use crate::session::store::CounterStore;

pub(crate) struct WorkerContext {
    pub kind: ExerciseKind,
    pub backend: Arc<dyn SessionBackend>,
    pub store: CounterStore,
    pub hub: NotificationHub,
    pub frame_tx: broadcast::Sender<Bytes>,
    pub cancel: CancellationToken,
    pub running: Arc<AtomicBool>,
    pub jpeg_quality: u8,
}

/// Worker thread entry point. Whatever ends the loop, the final count is
/// snapshotted into the store and the session is marked not running.
pub(crate) fn run(ctx: WorkerContext) {
    info!(exercise = %ctx.kind, "session worker starting");
    let final_count = pump(&ctx);
    ctx.store.record(ctx.kind, final_count);
    ctx.running.store(false, Ordering::SeqCst);
    info!(exercise = %ctx.kind, count = final_count, "session worker stopped");
}

/// Owns the capture device and estimator context for the session lifetime;
/// both are dropped on every return path.
fn pump(ctx: &WorkerContext) -> u32 {
    let profile = ctx.kind.profile();
    let mut counter = RepCounter::new(ctx.kind);

    let mut source = match ctx.backend.open_video(ctx.kind) {
        Ok(source) => source,
        Err(err) => {
            error!(exercise = %ctx.kind, "{err}");
            return counter.count();
        }
    };
    let mut estimator = match ctx.backend.open_estimator(ctx.kind) {
        Ok(estimator) => estimator,
        Err(err) => {
            error!(exercise = %ctx.kind, "{err}");
            return counter.count();
        }
    };

    loop {
        // Cooperative cancellation, checked once per iteration.
        if ctx.cancel.is_cancelled() {
            break;
        }

        let frame = match source.next_frame() {
            Ok(Some(frame)) => frame,
            Ok(None) => {
                info!(exercise = %ctx.kind, "video source ended");
                break;
            }
            Err(err) => {
                error!(exercise = %ctx.kind, "{err}");
                break;
            }
        };

        // Missing landmarks and backend faults both skip the state update
        // for this frame; the session stays up.
        let landmarks = match estimator.detect(&frame) {
            Ok(landmarks) => landmarks,
            Err(err) => {
                warn!(exercise = %ctx.kind, "{err}");
                None
            }
        };

        let mut angle = None;
        if let Some(set) = landmarks.as_ref() {
            let (proximal, vertex, distal) = set.triplet(profile.joints);
            let sample = joint_angle(proximal, vertex, distal);
            if sample.reliable {
                angle = Some(sample.degrees);
            }
            if let Some(event) = counter.observe(sample) {
                ctx.store.record(ctx.kind, event.count);
                ctx.hub.publish(CountUpdate {
                    kind: event.kind,
                    count: event.count,
                    stage: event.stage,
                });
                info!(exercise = %ctx.kind, count = event.count, "rep completed");
            }
        }

        let hud = Hud {
            exercise: ctx.kind.display_name(),
            count: counter.count(),
            stage: counter.stage_label(),
            angle,
        };
        let image = annotate::render(&frame, landmarks.as_ref(), &hud);
        match annotate::encode_jpeg(&image, ctx.jpeg_quality) {
            // No subscribers just drops the frame.
            Ok(jpeg) => {
                let _ = ctx.frame_tx.send(Bytes::from(jpeg));
            }
            Err(err) => {
                warn!(exercise = %ctx.kind, "skipping frame: {err}");
            }
        }
    }

    counter.count()
}
