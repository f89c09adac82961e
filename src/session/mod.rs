pub mod store;
mod worker;

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use bytes::Bytes;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::capture::VideoSource;
use crate::config::Configuration;
use crate::error::{CaptureError, PoseError, SessionError};
use crate::exercise::ExerciseKind;
use crate::notify::NotificationHub;
use crate::pose::PoseEstimator;
use store::CounterStore;

/// Factory for the per-session capture device and estimator context. Both
/// are opened inside the worker thread and owned by it for the session's
/// lifetime, so a concurrent `start` can never double-acquire a device.
pub trait SessionBackend: Send + Sync {
    fn open_video(&self, kind: ExerciseKind) -> Result<Box<dyn VideoSource>, CaptureError>;
    fn open_estimator(&self, kind: ExerciseKind) -> Result<Box<dyn PoseEstimator>, PoseError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    Started,
    AlreadyRunning,
}

struct SessionSlot {
    cancel: CancellationToken,
    running: Arc<AtomicBool>,
    worker: Option<std::thread::JoinHandle<()>>,
}

/// Owns the lifecycle of one worker thread per exercise. HTTP handlers talk
/// only to this controller and the store, never to the loop itself.
pub struct SessionController {
    backend: Arc<dyn SessionBackend>,
    store: CounterStore,
    hub: NotificationHub,
    frames: HashMap<ExerciseKind, broadcast::Sender<Bytes>>,
    sessions: Mutex<HashMap<ExerciseKind, SessionSlot>>,
    jpeg_quality: u8,
}

impl SessionController {
    pub fn new(
        backend: Arc<dyn SessionBackend>,
        store: CounterStore,
        hub: NotificationHub,
        configuration: &Configuration,
    ) -> Self {
        let frames = ExerciseKind::ALL
            .iter()
            .map(|&kind| {
                let (tx, _) = broadcast::channel(configuration.frame_channel_capacity.max(1));
                (kind, tx)
            })
            .collect();
        Self {
            backend,
            store,
            hub,
            frames,
            sessions: Mutex::new(HashMap::new()),
            jpeg_quality: configuration.jpeg_quality,
        }
    }

    /// Idempotent: a second start while a session is running (or still
    /// winding down) is a successful no-op and spawns nothing.
    pub fn start(&self, kind: ExerciseKind) -> Result<StartOutcome, SessionError> {
        let mut sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(slot) = sessions.get_mut(&kind) {
            if slot.running.load(Ordering::SeqCst) {
                return Ok(StartOutcome::AlreadyRunning);
            }
            // Previous worker already finished; reap it before respawning.
            if let Some(handle) = slot.worker.take() {
                if handle.join().is_err() {
                    warn!(exercise = %kind, "previous session worker panicked");
                }
            }
            sessions.remove(&kind);
        }

        let cancel = CancellationToken::new();
        let running = Arc::new(AtomicBool::new(true));
        let context = worker::WorkerContext {
            kind,
            backend: Arc::clone(&self.backend),
            store: self.store.clone(),
            hub: self.hub.clone(),
            frame_tx: self.frames[&kind].clone(),
            cancel: cancel.clone(),
            running: Arc::clone(&running),
            jpeg_quality: self.jpeg_quality,
        };
        let handle = std::thread::Builder::new()
            .name(format!("{kind}-session"))
            .spawn(move || worker::run(context))
            .map_err(SessionError::Spawn)?;

        sessions.insert(
            kind,
            SessionSlot {
                cancel,
                running,
                worker: Some(handle),
            },
        );
        info!(exercise = %kind, "session started");
        Ok(StartOutcome::Started)
    }

    /// Best-effort and non-blocking: the worker observes the flag at the top
    /// of its next iteration, so the device may still be held when this
    /// returns. Returns whether a running session was signalled.
    pub fn stop(&self, kind: ExerciseKind) -> bool {
        let sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);
        match sessions.get(&kind) {
            Some(slot) if slot.running.load(Ordering::SeqCst) => {
                slot.cancel.cancel();
                info!(exercise = %kind, "session stop requested");
                true
            }
            _ => false,
        }
    }

    pub fn is_running(&self, kind: ExerciseKind) -> bool {
        let sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);
        sessions
            .get(&kind)
            .map(|slot| slot.running.load(Ordering::SeqCst))
            .unwrap_or(false)
    }

    pub fn last_count(&self, kind: ExerciseKind) -> u32 {
        self.store.last(kind)
    }

    pub fn subscribe_frames(&self, kind: ExerciseKind) -> broadcast::Receiver<Bytes> {
        self.frames[&kind].subscribe()
    }

    fn cancel_all(&self) {
        let sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);
        for slot in sessions.values() {
            slot.cancel.cancel();
        }
    }

    /// Process shutdown: signal every session and wait for the workers to
    /// release their devices and snapshot their counts.
    pub fn shutdown(&self) {
        self.cancel_all();
        let mut sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);
        for (kind, slot) in sessions.iter_mut() {
            if let Some(handle) = slot.worker.take() {
                if handle.join().is_err() {
                    warn!(exercise = %kind, "session worker panicked during shutdown");
                }
            }
        }
    }
}

impl Drop for SessionController {
    fn drop(&mut self) {
        self.cancel_all();
    }
}
