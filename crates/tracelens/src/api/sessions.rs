use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::response::Json;
use serde::Serialize;
use serde_json::Value;

use tracelens_sessions::{parse_session_payload, IngestError, Session, SessionCounts};

use super::{ApiError, AppState};

#[derive(Debug, Serialize)]
pub struct SessionList {
    pub sessions: Vec<Arc<Session>>,
}

#[derive(Debug, Serialize)]
pub struct CountsList {
    pub counts: Vec<SessionCounts>,
}

#[derive(Debug, Serialize)]
pub struct Ack {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

pub async fn list_sessions(State(state): State<AppState>) -> Json<SessionList> {
    Json(SessionList {
        sessions: state.store.sessions(),
    })
}

pub async fn create_session(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<Ack>, ApiError> {
    let payload = serde_json::from_slice::<Value>(&body)
        .map_err(IngestError::from)
        .and_then(|value| parse_session_payload(&value))
        .inspect_err(|err| tracing::warn!(error = %err, "rejected session payload"))?;

    let session = state.store.add_session(payload)?;

    Ok(Json(Ack {
        ok: true,
        id: Some(session.id.clone()),
    }))
}

pub async fn get_counts(State(state): State<AppState>) -> Json<CountsList> {
    Json(CountsList {
        counts: state.store.counts(),
    })
}

pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Arc<Session>>, ApiError> {
    state
        .store
        .get(&id)
        .map(Json)
        .ok_or(ApiError::SessionNotFound(id))
}

pub async fn delete_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Ack>, ApiError> {
    if !state.store.remove_session(&id) {
        return Err(ApiError::SessionNotFound(id));
    }
    Ok(Json(Ack { ok: true, id: None }))
}
