//! Metrics and health endpoints.

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use np_06_processing_queue::QueueApi;
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{error, info};

#[derive(Clone)]
struct AppState {
    queue: Arc<dyn QueueApi>,
}

pub fn build_router(queue: Arc<dyn QueueApi>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(metrics))
        .with_state(AppState { queue })
}

async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    match state.queue.pending_count().await {
        Ok(pending) => (
            StatusCode::OK,
            Json(json!({ "status": "ok", "pending": pending })),
        ),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "status": "degraded", "error": e.to_string() })),
        ),
    }
}

async fn metrics() -> (StatusCode, String) {
    match notify_telemetry::encode_metrics() {
        Ok(text) => (StatusCode::OK, text),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    }
}

/// Serve until the shutdown flag flips.
pub async fn serve(
    addr: SocketAddr,
    queue: Arc<dyn QueueApi>,
    mut shutdown: watch::Receiver<bool>,
) -> std::io::Result<()> {
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("[runtime] Metrics endpoint bind failed on {}: {}", addr, e);
            return Err(e);
        }
    };
    info!(addr = %addr, "[runtime] Metrics endpoint listening");

    let result = axum::serve(listener, build_router(queue))
        .with_graceful_shutdown(async move {
            let _ = shutdown.changed().await;
        })
        .await;
    if let Err(e) = &result {
        error!("[runtime] Metrics endpoint failed: {}", e);
    }
    result
}
