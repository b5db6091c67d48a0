use crate::core::node::{NodeId, NodeKind};
use crate::core::value::ValueKind;
use std::sync::Mutex;

/// One node refresh performed by a kick.
#[derive(Debug, Clone, PartialEq)]
pub struct RefreshEvent {
    pub node: NodeId,
    pub kind: NodeKind,
    /// Kind of the refreshed value, `None` when it came out absent.
    pub value: Option<ValueKind>,
    /// Distance from the node that started the cascade (0 for the origin itself).
    pub depth: usize,
}

impl RefreshEvent {
    pub fn is_resolvable(&self) -> bool {
        self.value.is_some()
    }
}

/// Receives refresh notifications; a UI layer implements this to repaint nodes.
pub trait GraphObserver: Send {
    fn refreshed(&self, event: RefreshEvent);
}

/// Ignores every notification.
pub struct NullObserver;

impl GraphObserver for NullObserver {
    fn refreshed(&self, _event: RefreshEvent) {}
}

/// Simple in-memory collector for refresh events.
#[derive(Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<RefreshEvent>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<RefreshEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    /// Drains the recorded events.
    pub fn take(&self) -> Vec<RefreshEvent> {
        self.events
            .lock()
            .map(|mut e| std::mem::take(&mut *e))
            .unwrap_or_default()
    }
}

impl GraphObserver for RecordingObserver {
    fn refreshed(&self, event: RefreshEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}

impl<T: GraphObserver + Sync> GraphObserver for std::sync::Arc<T> {
    fn refreshed(&self, event: RefreshEvent) {
        (**self).refreshed(event)
    }
}
