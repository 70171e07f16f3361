//! Liveness endpoint for the hosting platform's uptime checks.
//!
//! `GET /` answers with a fixed line no matter what the Discord connection is
//! doing. `GET /health` adds a small JSON status for humans.

use std::{
    net::SocketAddr,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Instant,
};

use axum::{Json, Router, extract::State, http::StatusCode, routing::get};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::info;

use crate::base::{phrases::LIVENESS_MESSAGE, types::Void};

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub ready: bool,
    pub bot_username: Option<String>,
    pub uptime_secs: u64,
}

/// Readiness shared between the Discord handler and the liveness server.
#[derive(Clone)]
pub struct Readiness {
    start_time: Instant,
    ready: Arc<AtomicBool>,
    bot_username: Arc<RwLock<Option<String>>>,
}

impl Readiness {
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            ready: Arc::new(AtomicBool::new(false)),
            bot_username: Arc::new(RwLock::new(None)),
        }
    }

    /// Record that the gateway session is up.
    pub async fn set_ready(&self, username: String) {
        *self.bot_username.write().await = Some(username);
        self.ready.store(true, Ordering::Release);
    }

    /// Track the gateway connection; `ready` follows it after the first session.
    pub fn set_connected(&self, connected: bool) {
        self.ready.store(connected, Ordering::Release);
    }

    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    pub async fn status(&self) -> HealthStatus {
        HealthStatus {
            status: "ok".to_string(),
            ready: self.is_ready(),
            bot_username: self.bot_username.read().await.clone(),
            uptime_secs: self.start_time.elapsed().as_secs(),
        }
    }
}

impl Default for Readiness {
    fn default() -> Self {
        Self::new()
    }
}

async fn root_handler() -> &'static str {
    LIVENESS_MESSAGE
}

async fn health_handler(State(state): State<Readiness>) -> (StatusCode, Json<HealthStatus>) {
    (StatusCode::OK, Json(state.status().await))
}

/// Create the liveness router.
pub fn create_router(state: Readiness) -> Router {
    Router::new().route("/", get(root_handler)).route("/health", get(health_handler)).with_state(state)
}

/// Bind the liveness listener.
///
/// Binding happens up front so a taken port fails startup instead of a background task.
pub async fn bind(addr: &str) -> crate::base::types::Res<TcpListener> {
    let listener = TcpListener::bind(addr).await.map_err(|e| anyhow::anyhow!("Failed to bind liveness endpoint on {}: {}", addr, e))?;
    Ok(listener)
}

/// Serve the liveness endpoint until the process exits.
pub async fn serve(listener: TcpListener, state: Readiness) -> Void {
    let addr: Option<SocketAddr> = listener.local_addr().ok();
    info!("Liveness endpoint listening on {:?}", addr);

    axum::serve(listener, create_router(state)).await?;

    Ok(())
}

// Tests.
