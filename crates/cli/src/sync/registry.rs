// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Subscription registry for push channel signals.
//!
//! Handlers are keyed by [`EventKind`]. Several callers may register for
//! the same kind; nothing is deduplicated. Dispatch snapshots the handler
//! list and invokes it without holding the lock, so a handler may
//! subscribe or unsubscribe re-entrantly.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use ocat_core::{ChannelEvent, EventKind};

/// Callback invoked for each matching signal.
pub type Handler = Arc<dyn Fn(&ChannelEvent) + Send + Sync>;

/// Identifies one registered handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

#[derive(Default)]
pub struct Registry {
    next_id: AtomicU64,
    handlers: Mutex<HashMap<EventKind, Vec<(SubscriptionId, Handler)>>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<EventKind, Vec<(SubscriptionId, Handler)>>> {
        self.handlers.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn subscribe(&self, kind: EventKind, handler: Handler) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.lock().entry(kind).or_default().push((id, handler));
        id
    }

    /// Removes every handler registered for `kind`. Returns how many were removed.
    pub fn unsubscribe(&self, kind: EventKind) -> usize {
        self.lock().remove(&kind).map_or(0, |list| list.len())
    }

    /// Removes a single handler. Returns false if it was already gone.
    pub fn unsubscribe_id(&self, id: SubscriptionId) -> bool {
        let mut handlers = self.lock();
        for list in handlers.values_mut() {
            if let Some(pos) = list.iter().position(|(sid, _)| *sid == id) {
                list.remove(pos);
                return true;
            }
        }
        false
    }

    pub fn handler_count(&self, kind: EventKind) -> usize {
        self.lock().get(&kind).map_or(0, Vec::len)
    }

    /// Invokes every handler registered for the event's kind.
    pub fn dispatch(&self, event: &ChannelEvent) -> usize {
        let snapshot: Vec<Handler> = self
            .lock()
            .get(&event.kind())
            .map(|list| list.iter().map(|(_, h)| Arc::clone(h)).collect())
            .unwrap_or_default();
        for handler in &snapshot {
            handler(event);
        }
        snapshot.len()
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let counts: Vec<(EventKind, usize)> = EventKind::ALL
            .iter()
            .map(|kind| (*kind, self.handler_count(*kind)))
            .collect();
        f.debug_struct("Registry").field("handlers", &counts).finish()
    }
}
