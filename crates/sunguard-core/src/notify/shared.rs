use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::engine::NotificationDecisionEngine;
use super::request::Decision;
use super::sink::NotificationSink;
use crate::events::EngineEvent;

/// Thread-safe handle for hosts whose callbacks arrive on several threads.
///
/// Events are serialized through one lock, so each transition is observed
/// whole: two concurrent geofence exits still produce a single alert.
#[derive(Debug, Clone)]
pub struct SharedDecisionEngine {
    inner: Arc<Mutex<NotificationDecisionEngine>>,
}

impl SharedDecisionEngine {
    pub fn new(engine: NotificationDecisionEngine) -> Self {
        Self {
            inner: Arc::new(Mutex::new(engine)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, NotificationDecisionEngine> {
        // A panic mid-transition leaves the last committed state; keep going.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn handle(&self, event: &EngineEvent) -> Decision {
        self.lock().handle(event)
    }

    /// Handle and dispatch while holding the lock, so commands reach the sink
    /// in the order the engine produced them.
    pub fn handle_and_dispatch(&self, event: &EngineEvent, sink: &dyn NotificationSink) -> Decision {
        let mut engine = self.lock();
        let decision = engine.handle(event);
        decision.dispatch(sink);
        decision
    }

    /// Copy of the current state, e.g. for persistence.
    pub fn snapshot(&self) -> NotificationDecisionEngine {
        self.lock().clone()
    }
}
