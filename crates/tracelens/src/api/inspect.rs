use axum::extract::{Path, State};
use axum::response::Json;
use serde::Serialize;

use tracelens_outline::StepGroup;

use super::{ApiError, AppState};
use crate::inspect::{graph_views, outline, GraphView};

#[derive(Debug, Serialize)]
pub struct OutlineResponse {
    pub groups: Vec<StepGroup>,
}

pub async fn get_outline(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<OutlineResponse>, ApiError> {
    let session = state.store.get(&id).ok_or(ApiError::SessionNotFound(id))?;

    Ok(Json(OutlineResponse {
        groups: outline(session.as_ref()),
    }))
}

pub async fn get_entry_graphs(
    State(state): State<AppState>,
    Path((id, index)): Path<(String, usize)>,
) -> Result<Json<Vec<GraphView>>, ApiError> {
    let session = state
        .store
        .get(&id)
        .ok_or_else(|| ApiError::SessionNotFound(id.clone()))?;
    let entry = session
        .entry(index)
        .ok_or(ApiError::EntryNotFound { id, index })?;

    Ok(Json(graph_views(entry)))
}
