use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use colored::Colorize;
use tokio::sync::watch;

use tracelens_sessions::SessionStore;

use crate::api::{self, AppState};
use crate::config::Config;

/// Run the HTTP server until Ctrl+C.
pub async fn handle_serve_command(config: &Config) -> Result<()> {
    let store = Arc::new(SessionStore::with_event_buffer(config.event_buffer));
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let state = AppState {
        store: Arc::clone(&store),
        keepalive: config.keepalive,
        shutdown: shutdown_rx,
    };
    let router = api::create_router(state, config.max_payload_bytes);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind server to {}", addr))?;
    let local = listener
        .local_addr()
        .context("Failed to read bound address")?;
    tracing::info!(%local, keepalive = ?config.keepalive, "server listening");

    let url = browse_url(local);
    eprintln!();
    eprintln!(
        "  {} {}",
        "->".bright_green(),
        format!("Serving on {}", url).bold()
    );
    eprintln!(
        "  {} POST traces to {}",
        "->".dimmed(),
        format!("{}/api/debug", url).cyan()
    );
    eprintln!("  {} Press {} to stop", "->".dimmed(), "Ctrl+C".bold());
    eprintln!();

    if config.open_browser {
        if let Err(e) = open::that(&url) {
            eprintln!("Failed to open browser: {} (open {} manually)", e, url);
        }
    }

    let result = axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal(shutdown_tx))
        .await;

    tracing::info!(sessions = store.len(), "server stopped");
    result.context("Server error")
}

/// Loopback or unspecified binds are reachable as `localhost`.
fn browse_url(addr: SocketAddr) -> String {
    let ip = addr.ip();
    if ip.is_unspecified() || ip.is_loopback() {
        format!("http://localhost:{}", addr.port())
    } else {
        format!("http://{}", addr)
    }
}

async fn shutdown_signal(shutdown: watch::Sender<bool>) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
    eprintln!("\nShutting down...");
    // Ends live streams so open connections can drain.
    let _ = shutdown.send(true);
}
