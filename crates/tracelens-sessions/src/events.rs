use std::sync::{Arc, Mutex, PoisonError, Weak};

use crate::types::Session;

/// Change notification emitted by the store.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    Added(Arc<Session>),
    Deleted(String),
}

impl SessionEvent {
    pub fn session_id(&self) -> &str {
        match self {
            SessionEvent::Added(session) => &session.id,
            SessionEvent::Deleted(id) => id,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            SessionEvent::Added(_) => "added",
            SessionEvent::Deleted(_) => "deleted",
        }
    }
}

/// Callback registered with [`crate::SessionStore::subscribe`].
pub type Listener = dyn Fn(&SessionEvent) -> anyhow::Result<()> + Send + Sync;

#[derive(Default)]
pub(crate) struct ListenerRegistry {
    next_id: u64,
    listeners: Vec<(u64, Arc<Listener>)>,
}

impl ListenerRegistry {
    pub(crate) fn insert(&mut self, listener: Arc<Listener>) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.listeners.push((id, listener));
        id
    }

    pub(crate) fn remove(&mut self, id: u64) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(existing, _)| *existing != id);
        self.listeners.len() != before
    }

    /// Listeners in subscription order.
    pub(crate) fn snapshot(&self) -> Vec<Arc<Listener>> {
        self.listeners.iter().map(|(_, l)| Arc::clone(l)).collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.listeners.len()
    }
}

/// Handle for a registered listener. Dropping it unsubscribes.
#[must_use = "dropping a Subscription unsubscribes the listener immediately"]
pub struct Subscription {
    id: u64,
    registry: Weak<Mutex<ListenerRegistry>>,
}

impl Subscription {
    pub(crate) fn new(id: u64, registry: Weak<Mutex<ListenerRegistry>>) -> Self {
        Self { id, registry }
    }

    /// Remove the listener now.
    pub fn unsubscribe(self) {
        drop(self);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        // The store may already be gone.
        if let Some(registry) = self.registry.upgrade() {
            registry
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .remove(self.id);
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}
