use std::convert::Infallible;
use std::sync::Arc;

use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use serde::Serialize;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::wrappers::{BroadcastStream, WatchStream};
use tokio_stream::StreamExt;

use tracelens_sessions::{Session, SessionEvent};

use super::AppState;

/// Messages pushed to live observers. Sent as unnamed `data:` events whose
/// JSON carries the `type` tag.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum StreamMessage {
    Init { payload: Vec<Arc<Session>> },
    Add { payload: Arc<Session> },
    Delete { id: String },
}

impl StreamMessage {
    fn into_event(self) -> Event {
        Event::default().data(serde_json::to_string(&self).unwrap_or_default())
    }
}

impl From<SessionEvent> for StreamMessage {
    fn from(event: SessionEvent) -> Self {
        match event {
            SessionEvent::Added(session) => StreamMessage::Add { payload: session },
            SessionEvent::Deleted(id) => StreamMessage::Delete { id },
        }
    }
}

enum Outgoing {
    Message(StreamMessage),
    Stop,
}

/// Logs the observer's departure when the response stream is dropped.
struct ObserverGuard;

impl Drop for ObserverGuard {
    fn drop(&mut self) {
        tracing::debug!("observer disconnected");
    }
}

pub async fn session_stream(
    State(state): State<AppState>,
) -> Sse<impl tokio_stream::Stream<Item = Result<Event, Infallible>>> {
    let (snapshot, rx) = state.store.watch();
    tracing::debug!(
        sessions = snapshot.len(),
        observers = state.store.watcher_count(),
        "observer connected"
    );

    let guard = ObserverGuard;
    let store = Arc::clone(&state.store);
    let updates = BroadcastStream::new(rx).map(move |result| {
        let _observer = &guard;
        match result {
            Ok(event) => StreamMessage::from(event),
            // Missed events cannot be replayed; resynchronize instead.
            Err(BroadcastStreamRecvError::Lagged(missed)) => {
                tracing::warn!(missed, "observer lagged, resending snapshot");
                StreamMessage::Init {
                    payload: store.sessions(),
                }
            }
        }
    });

    let stop = WatchStream::new(state.shutdown.clone())
        .filter(|down| *down)
        .map(|_| Outgoing::Stop);

    let stream = tokio_stream::once(StreamMessage::Init { payload: snapshot })
        .chain(updates)
        .map(Outgoing::Message)
        .merge(stop)
        .take_while(|outgoing| matches!(outgoing, Outgoing::Message(_)))
        .filter_map(|outgoing| match outgoing {
            Outgoing::Message(message) => Some(Ok::<_, Infallible>(message.into_event())),
            Outgoing::Stop => None,
        });

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(state.keepalive)
            .text("keep-alive"),
    )
}
