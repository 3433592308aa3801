//! Dashboard web server
//!
//! Serves the embedded dashboard page, a system-info query endpoint,
//! and the `/ws/metrics` WebSocket. Every cache change pushes the full
//! cache to all connected viewers; a viewer whose connection fails is
//! dropped without disturbing the others.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::{Html, IntoResponse, Response},
    routing::get,
    Json, Router,
};
use futures::{SinkExt, StreamExt};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::broadcast;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

use crate::cache::MetricsCache;

/// Capacity of the viewer broadcast channel; absorbs bursty updates
/// without dropping notifications.
const BROADCAST_CAPACITY: usize = 256;

/// Dashboard configuration
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    /// Directory the monitor writes suite metrics files into
    pub results_dir: PathBuf,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            results_dir: testpulse_common::default_results_dir(),
        }
    }
}

/// Shared dashboard state: the cache plus the viewer fan-out channel
pub struct DashboardState {
    cache: MetricsCache,
    update_tx: broadcast::Sender<String>,
}

impl DashboardState {
    pub fn new() -> Arc<Self> {
        let (update_tx, _) = broadcast::channel(BROADCAST_CAPACITY);
        Arc::new(Self {
            cache: MetricsCache::new(),
            update_tx,
        })
    }

    pub fn cache(&self) -> &MetricsCache {
        &self.cache
    }

    /// Subscribe to cache-update broadcasts
    pub fn subscribe(&self) -> broadcast::Receiver<String> {
        self.update_tx.subscribe()
    }

    /// Push the full cache snapshot to every connected viewer
    pub async fn broadcast(&self) {
        let snapshot = self.cache.snapshot().await.to_string();
        // Err only means no viewer is connected right now.
        let _ = self.update_tx.send(snapshot);
    }
}

/// Build the dashboard router
pub fn router(state: Arc<DashboardState>) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/api/system_info", get(system_info_handler))
        .route("/ws/metrics", get(ws_metrics_handler))
        .layer(CorsLayer::new().allow_origin(Any))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Scan, watch, and serve until shutdown
pub async fn serve(addr: SocketAddr, config: DashboardConfig) -> anyhow::Result<()> {
    let state = DashboardState::new();

    // Holds the notify handle; watching stops when serve returns.
    let _watcher = crate::watcher::spawn(&config.results_dir, state.clone()).await?;

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Dashboard listening on http://{}", addr);
    axum::serve(listener, router(state)).await?;
    Ok(())
}

async fn index_handler() -> impl IntoResponse {
    Html(include_str!("../static/dashboard.html"))
}

async fn system_info_handler(State(state): State<Arc<DashboardState>>) -> impl IntoResponse {
    Json(state.cache.system_info().await)
}

async fn ws_metrics_handler(
    State(state): State<Arc<DashboardState>>,
    ws: WebSocketUpgrade,
) -> Response {
    ws.on_upgrade(move |socket| handle_metrics_socket(socket, state))
}

async fn handle_metrics_socket(socket: WebSocket, state: Arc<DashboardState>) {
    debug!("viewer connected");
    let (mut sender, mut receiver) = socket.split();

    // First message: the current snapshot. No replay of older history.
    let snapshot = state.cache.snapshot().await.to_string();
    if sender.send(Message::Text(snapshot)).await.is_err() {
        return;
    }

    let mut updates = state.subscribe();
    loop {
        tokio::select! {
            update = updates.recv() => match update {
                Ok(text) => {
                    if sender.send(Message::Text(text)).await.is_err() {
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    // Each broadcast carries the full cache, so only
                    // the newest message matters.
                    debug!("viewer lagged, skipped {} updates", skipped);
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
            incoming = receiver.next() => match incoming {
                // Client messages are keep-alive only.
                Some(Ok(_)) => {}
                _ => break,
            },
        }
    }
    debug!("viewer disconnected");
}
