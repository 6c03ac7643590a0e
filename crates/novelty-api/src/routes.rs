//! Router setup with all API routes and middleware.
//!
//! Configures the axum Router with CORS, tracing, compression, and all
//! endpoint handlers.

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Create the axum Router with all routes and middleware.
///
/// # Arguments
/// * `state` - The shared application state.
///
/// # Returns
/// A fully configured axum Router ready to serve requests.
pub fn create_router(state: AppState) -> Router {
    // Permissive CORS: this is an API-only service fronted by callers on
    // arbitrary origins. Tighten at the deployment edge if needed.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handlers::health))
        .route("/check", post(handlers::check))
        .route("/check/document", post(handlers::check_document))
        .route("/evaluate", post(handlers::evaluate))
        .route("/ingest", post(handlers::ingest))
        .route("/ingest/document", post(handlers::ingest_document))
        .route("/proposals/{key}", get(handlers::get_proposal))
        // 10MB limit covers document uploads; JSON bodies are far smaller.
        .layer(DefaultBodyLimit::max(10 * 1024 * 1024))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Start the HTTP server on the given port.
pub async fn start_server(port: u16, state: AppState) -> Result<(), novelty_core::NoveltyError> {
    let addr = format!("0.0.0.0:{}", port);

    let router = create_router(state);

    tracing::info!("Starting API server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| novelty_core::NoveltyError::Api(format!("Failed to bind: {}", e)))?;

    axum::serve(listener, router)
        .await
        .map_err(|e| novelty_core::NoveltyError::Api(format!("Server error: {}", e)))?;

    Ok(())
}
