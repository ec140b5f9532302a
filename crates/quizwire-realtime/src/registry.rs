//! Event handler registry.
//!
//! Handlers are keyed by [`EventKind`] and kept in registration order.
//! Duplicate registrations are allowed; each gets its own [`HandlerId`].
//! Dispatch snapshots the handler list so a handler may register or remove
//! handlers without deadlocking.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;

use crate::messages::{EventKind, ServerEvent};

/// An event callback.
pub type Handler = Arc<dyn Fn(&ServerEvent) + Send + Sync>;

/// Token identifying one registration, for targeted removal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct HandlerId(u64);

/// Insertion-ordered handler table.
#[derive(Default)]
pub struct HandlerRegistry {
    next_id: AtomicU64,
    handlers: Mutex<HashMap<EventKind, Vec<(HandlerId, Handler)>>>,
}

impl HandlerRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for an event kind.
    pub fn on(&self, kind: EventKind, handler: Handler) -> HandlerId {
        let id = HandlerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.handlers
            .lock()
            .entry(kind)
            .or_default()
            .push((id, handler));
        id
    }

    /// Remove one registration. Unknown IDs are a no-op.
    pub fn off(&self, kind: EventKind, id: HandlerId) {
        if let Some(entries) = self.handlers.lock().get_mut(&kind) {
            entries.retain(|(entry_id, _)| *entry_id != id);
        }
    }

    /// Snapshot the handlers for a kind, in registration order.
    pub fn handlers_for(&self, kind: EventKind) -> Vec<Handler> {
        self.handlers
            .lock()
            .get(&kind)
            .map(|entries| entries.iter().map(|(_, h)| Arc::clone(h)).collect())
            .unwrap_or_default()
    }

    /// Number of handlers registered for a kind.
    pub fn count(&self, kind: EventKind) -> usize {
        self.handlers.lock().get(&kind).map_or(0, Vec::len)
    }

    /// Remove all registrations.
    pub fn clear(&self) {
        self.handlers.lock().clear();
    }

    /// Invoke every handler registered for the event's kind, in order.
    ///
    /// The handler list is snapshotted first; the registry lock is not held
    /// during handler execution.
    pub fn dispatch(&self, event: &ServerEvent) {
        for handler in self.handlers_for(event.kind()) {
            handler(event);
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
