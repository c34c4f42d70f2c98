pub mod routes;

use std::sync::Arc;

use axum::routing::any;
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::daemon::service::HashService;
use crate::models::ServerConfig;

/// Shared application state for the Axum server.
pub struct AppState {
    pub service: Arc<HashService>,
    pub config: Arc<ServerConfig>,
    pub shutdown_tx: Option<tokio::sync::watch::Sender<()>>,
}

/// Create the Axum router with all routes.
///
/// Methods are checked inside the handlers so that a wrong method answers
/// 400 rather than axum's default 405.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/hash", any(routes::submit_hash))
        .route("/hash/", any(routes::fetch_hash_missing_id))
        .route("/hash/{id}", any(routes::fetch_hash))
        .route("/stats", any(routes::stats))
        .route("/shutdown", any(routes::shutdown))
        .fallback(routes::fallback)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
