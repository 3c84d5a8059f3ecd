//! Relay server speaking the broker protocol
//!
//! Stores the last posted move and hands it to whoever asks. No game rules
//! are checked here; clients validate the turn number themselves.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use tokio::net::TcpListener;
use tokio::sync::RwLock;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::wire::{BrokerEnvelope, BrokerMove};

/// Relay configuration
#[derive(Clone, Debug)]
pub struct RelayConfig {
    pub port: u16,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self { port: 8001 }
    }
}

/// Shared relay state
#[derive(Debug, Default)]
pub struct RelayState {
    last_move: RwLock<Option<BrokerMove>>,
}

impl RelayState {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn last_move(&self) -> Option<BrokerMove> {
        *self.last_move.read().await
    }
}

// ============================================================================
// HANDLERS
// ============================================================================

async fn get_move(State(state): State<Arc<RelayState>>) -> Json<BrokerEnvelope> {
    Json(BrokerEnvelope::ok(state.last_move().await))
}

async fn post_move(
    State(state): State<Arc<RelayState>>,
    Json(mv): Json<BrokerMove>,
) -> Json<BrokerEnvelope> {
    *state.last_move.write().await = Some(mv);
    tracing::debug!(from = %mv.from, to = %mv.to, turn = mv.turn, "stored move");
    Json(BrokerEnvelope::ok(Some(mv)))
}

#[derive(Serialize)]
struct StatusResponse {
    status: &'static str,
    version: &'static str,
}

async fn status_handler() -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

// ============================================================================
// ROUTER
// ============================================================================

/// Create the router with all routes
pub fn create_router(state: Arc<RelayState>) -> Router {
    Router::new()
        .route("/", get(get_move).post(post_move))
        .route("/status", get(status_handler))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Serve on an already bound listener
pub async fn serve(listener: TcpListener, state: Arc<RelayState>) -> std::io::Result<()> {
    axum::serve(listener, create_router(state)).await
}

/// Start the relay on all interfaces
pub async fn run_server(config: RelayConfig) -> anyhow::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(addr).await?;

    tracing::info!("Broker relay listening on http://0.0.0.0:{}", config.port);

    serve(listener, Arc::new(RelayState::new())).await?;
    Ok(())
}
