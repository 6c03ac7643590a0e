//! Novelty API crate - axum HTTP server and route handlers.
//!
//! Provides the REST surface for the novelty service: read-only checks,
//! store-then-compare evaluation, ingestion (JSON and raw documents),
//! proposal lookup, and health checks.

pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use routes::{create_router, start_server};
pub use state::AppState;
