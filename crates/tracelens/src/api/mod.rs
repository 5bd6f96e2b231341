mod error;
mod inspect;
mod sessions;
mod sse;

use std::sync::Arc;
use std::time::Duration;

use axum::extract::DefaultBodyLimit;
use axum::routing::get;
use axum::Router;
use tokio::sync::watch;
use tower_http::cors::CorsLayer;

use tracelens_sessions::SessionStore;

pub use error::ApiError;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<SessionStore>,
    /// Idle interval between keep-alive comments on live streams
    pub keepalive: Duration,
    /// Flips to `true` when the server begins shutting down; live streams
    /// end so graceful shutdown is not held open by idle observers.
    pub shutdown: watch::Receiver<bool>,
}

pub fn create_router(state: AppState, max_payload_bytes: usize) -> Router {
    Router::new()
        .route(
            "/api/debug",
            get(sessions::list_sessions).post(sessions::create_session),
        )
        .route("/api/debug/counts", get(sessions::get_counts))
        .route("/api/debug/stream", get(sse::session_stream))
        .route(
            "/api/debug/{id}",
            get(sessions::get_session).delete(sessions::delete_session),
        )
        .route("/api/debug/{id}/outline", get(inspect::get_outline))
        .route(
            "/api/debug/{id}/entries/{index}/graphs",
            get(inspect::get_entry_graphs),
        )
        .layer(DefaultBodyLimit::max(max_payload_bytes))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
