//! In-process activity signal bus.
//!
//! Stands in for the document's event target: UI code (or the runner's
//! stdin loop) emits signals, subscribers receive them.

use std::collections::HashMap;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use tracing::trace;

use crate::domain::{ActivityHandler, ActivityKind, ActivitySource, Subscription};

#[derive(Default)]
struct Registry {
    next_id: u64,
    subscribers: HashMap<u64, (Vec<ActivityKind>, ActivityHandler)>,
}

/// Fan-out of activity signals to subscribed handlers.
#[derive(Clone, Default)]
pub struct ActivityBus {
    registry: Arc<Mutex<Registry>>,
}

impl ActivityBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver `kind` to every handler subscribed to it.
    ///
    /// Handlers run outside the registry lock, so a handler may subscribe or
    /// dispose without deadlocking. Returns the number of handlers invoked.
    pub fn emit(&self, kind: ActivityKind) -> usize {
        let handlers: Vec<ActivityHandler> = self
            .registry
            .lock()
            .subscribers
            .values()
            .filter(|(kinds, _)| kinds.contains(&kind))
            .map(|(_, handler)| Arc::clone(handler))
            .collect();

        trace!(%kind, handlers = handlers.len(), "Activity signal");
        for handler in &handlers {
            handler(kind);
        }
        handlers.len()
    }

    /// Number of (signal, handler) attachments currently live.
    pub fn listener_count(&self) -> usize {
        self.registry
            .lock()
            .subscribers
            .values()
            .map(|(kinds, _)| kinds.len())
            .sum()
    }

    /// Number of live subscriptions.
    pub fn subscription_count(&self) -> usize {
        self.registry.lock().subscribers.len()
    }
}

impl ActivitySource for ActivityBus {
    fn subscribe(&self, kinds: &[ActivityKind], handler: ActivityHandler) -> Subscription {
        let id = {
            let mut registry = self.registry.lock();
            let id = registry.next_id;
            registry.next_id += 1;
            registry.subscribers.insert(id, (kinds.to_vec(), handler));
            id
        };

        let registry: Weak<Mutex<Registry>> = Arc::downgrade(&self.registry);
        Subscription::new(move || {
            if let Some(registry) = registry.upgrade() {
                registry.lock().subscribers.remove(&id);
            }
        })
    }
}

impl std::fmt::Debug for ActivityBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActivityBus")
            .field("subscriptions", &self.subscription_count())
            .finish()
    }
}
