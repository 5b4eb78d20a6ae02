//! Read-only REST API for simulation state (feature `api`).
//!
//! Three GET endpoints, no mutating HTTP surface — bids and unit modes are
//! set through [`crate::world::World`]'s in-process setters only (spec §6):
//! - `/state` — clock position, latest snapshot, settlement KPIs
//! - `/history` — grid snapshots, optionally ranged by `time_s`
//! - `/bids` — current DA/FCR bid arrays and market prices

mod handlers;
mod types;

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::Router;
use axum::routing::get;

use crate::world::World;

/// Shared application state: a mutex-guarded [`World`] updated by the tick
/// loop and read by request handlers.
pub struct AppState {
    pub world: Mutex<World>,
}

/// Builds the axum router with all API routes.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/state", get(handlers::get_state))
        .route("/history", get(handlers::get_history))
        .route("/bids", get(handlers::get_bids))
        .with_state(state)
}

/// Binds to the given address and serves the API.
///
/// # Panics
///
/// Panics if the TCP listener cannot bind to `addr`.
pub async fn serve(state: Arc<AppState>, addr: SocketAddr) {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind to {addr}: {e}"));
    tracing::info!(%addr, "API server listening");
    axum::serve(listener, app)
        .await
        .unwrap_or_else(|e| panic!("server error: {e}"));
}
