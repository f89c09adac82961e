//! Mutex-guarded store of the last completed count per exercise.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use indexmap::IndexMap;

use crate::exercise::ExerciseKind;

/// Written by session workers, read by the query endpoints. Values survive
/// across sessions; within one running session the stored value only grows,
/// and a fresh session's zero is not written until its first completed rep
/// or its final snapshot.
#[derive(Clone, Default)]
pub struct CounterStore {
    inner: Arc<Mutex<HashMap<ExerciseKind, u32>>>,
}

impl CounterStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, kind: ExerciseKind, count: u32) {
        let mut guard = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        guard.insert(kind, count);
    }

    pub fn last(&self, kind: ExerciseKind) -> u32 {
        let guard = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        guard.get(&kind).copied().unwrap_or(0)
    }

    /// All counters keyed `last_<slug>_session`, in fixed exercise order.
    pub fn snapshot(&self) -> IndexMap<String, u32> {
        let guard = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        ExerciseKind::ALL
            .iter()
            .map(|kind| {
                (
                    format!("last_{}_session", kind.slug()),
                    guard.get(kind).copied().unwrap_or(0),
                )
            })
            .collect()
    }
}
