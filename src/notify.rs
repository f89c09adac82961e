//! Fire-and-forget push channel for completed repetitions.

use serde::Serialize;
use tokio::sync::broadcast;

use crate::exercise::ExerciseKind;

/// One completed rep, pushed as `{"count": n, "stage": "..."}` under the
/// `<slug>_count_update` event name.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct CountUpdate {
    #[serde(skip)]
    pub kind: ExerciseKind,
    pub count: u32,
    pub stage: &'static str,
}

impl CountUpdate {
    pub fn event_name(&self) -> String {
        format!("{}_count_update", self.kind.slug())
    }
}

#[derive(Clone)]
pub struct NotificationHub {
    tx: broadcast::Sender<CountUpdate>,
}

impl NotificationHub {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// No receivers is not an error; updates are simply dropped.
    pub fn publish(&self, update: CountUpdate) {
        let _ = self.tx.send(update);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CountUpdate> {
        self.tx.subscribe()
    }
}
