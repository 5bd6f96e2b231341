use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};

use chrono::Utc;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::error::StoreError;
use crate::events::{Listener, ListenerRegistry, SessionEvent, Subscription};
use crate::types::{NewSession, Session, SessionCounts};

/// Default capacity of the per-store event channel.
pub const DEFAULT_EVENT_BUFFER: usize = 256;

/// In-memory collection of sessions, in arrival order.
///
/// Mutations are serialized and every registered listener has been called
/// by the time `add_session`/`remove_session` returns. Listeners must not
/// mutate the store themselves.
pub struct SessionStore {
    sessions: RwLock<Vec<Arc<Session>>>,
    listeners: Arc<Mutex<ListenerRegistry>>,
    write_gate: Mutex<()>,
    tx: broadcast::Sender<SessionEvent>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::with_event_buffer(DEFAULT_EVENT_BUFFER)
    }

    /// Create a store whose event channel holds up to `capacity` undelivered
    /// events per receiver before that receiver lags.
    pub fn with_event_buffer(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self {
            sessions: RwLock::new(Vec::new()),
            listeners: Arc::new(Mutex::new(ListenerRegistry::default())),
            write_gate: Mutex::new(()),
            tx,
        }
    }

    /// Store a session and notify subscribers.
    ///
    /// A producer-supplied id is kept if unused; otherwise a UUID is assigned.
    pub fn add_session(&self, new: NewSession) -> Result<Arc<Session>, StoreError> {
        let _gate = lock(&self.write_gate);

        let id = new
            .id
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        let session = Arc::new(Session {
            id,
            entries: new.entries,
            code: new.code,
            file: new.file,
            received_at: Utc::now(),
        });

        {
            let mut sessions = self.sessions.write().unwrap_or_else(PoisonError::into_inner);
            if sessions.iter().any(|s| s.id == session.id) {
                return Err(StoreError::DuplicateId(session.id.clone()));
            }
            sessions.push(Arc::clone(&session));
            // No receivers is fine.
            let _ = self.tx.send(SessionEvent::Added(Arc::clone(&session)));
        }

        tracing::info!(
            id = %session.id,
            entries = session.entries.len(),
            "session added"
        );
        self.notify(&SessionEvent::Added(Arc::clone(&session)));

        Ok(session)
    }

    /// Remove the session with `id`. Returns whether anything was removed;
    /// subscribers only hear about actual removals.
    pub fn remove_session(&self, id: &str) -> bool {
        let _gate = lock(&self.write_gate);

        {
            let mut sessions = self.sessions.write().unwrap_or_else(PoisonError::into_inner);
            let Some(position) = sessions.iter().position(|s| s.id == id) else {
                tracing::debug!(%id, "remove of unknown session ignored");
                return false;
            };
            sessions.remove(position);
            let _ = self.tx.send(SessionEvent::Deleted(id.to_string()));
        }

        tracing::info!(%id, "session removed");
        self.notify(&SessionEvent::Deleted(id.to_string()));

        true
    }

    /// Snapshot of all sessions in insertion order.
    pub fn sessions(&self) -> Vec<Arc<Session>> {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn get(&self, id: &str) -> Option<Arc<Session>> {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .find(|s| s.id == id)
            .cloned()
    }

    /// Binding count of every entry of every session.
    pub fn counts(&self) -> Vec<SessionCounts> {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|s| SessionCounts {
                id: s.id.clone(),
                bindings: s.binding_counts(),
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Register a callback for every subsequent add/delete.
    ///
    /// Errors and panics raised by the callback are logged and otherwise
    /// ignored. The listener stays registered until the returned
    /// [`Subscription`] is dropped or unsubscribed.
    ///
    /// # Deadlocks
    ///
    /// Listeners run while the store holds its write gate. A listener that
    /// calls [`SessionStore::add_session`] or [`SessionStore::remove_session`]
    /// on the same store blocks forever. Reads (`get`, `sessions`, `len`,
    /// `counts`) are fine. To react with a mutation, hand the event to another
    /// task, or consume [`SessionStore::watch`] instead.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&SessionEvent) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        let listener: Arc<Listener> = Arc::new(listener);
        let id = lock(&self.listeners).insert(listener);
        Subscription::new(id, Arc::downgrade(&self.listeners))
    }

    /// Current snapshot plus a receiver for every later event, taken
    /// atomically: no event is both in the snapshot and on the receiver, and
    /// none falls between them. Dropping the receiver releases it.
    pub fn watch(&self) -> (Vec<Arc<Session>>, broadcast::Receiver<SessionEvent>) {
        let sessions = self.sessions.read().unwrap_or_else(PoisonError::into_inner);
        let rx = self.tx.subscribe();
        (sessions.clone(), rx)
    }

    pub fn listener_count(&self) -> usize {
        lock(&self.listeners).len()
    }

    /// Number of live receivers handed out by [`SessionStore::watch`].
    pub fn watcher_count(&self) -> usize {
        self.tx.receiver_count()
    }

    fn notify(&self, event: &SessionEvent) {
        let listeners = lock(&self.listeners).snapshot();

        for listener in listeners {
            match panic::catch_unwind(AssertUnwindSafe(|| (*listener)(event))) {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    tracing::error!(
                        event = event.kind(),
                        id = %event.session_id(),
                        "Failed to notify store listener: {:#}",
                        e
                    );
                }
                Err(_) => {
                    tracing::error!(
                        event = event.kind(),
                        id = %event.session_id(),
                        "Store listener panicked"
                    );
                }
            }
        }
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
