//! Route handler functions for all API endpoints.
//!
//! Each handler extracts its request via axum extractors, drives the
//! pipeline or repository from AppState, and returns a JSON response.
//! Two presentation variants exist for neighbor similarity: `/check`
//! reports a 0-1 fraction, `/evaluate` reports a 0-100 percentage.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use novelty_core::types::{NeighborMatch, Proposal};
use novelty_engine::extract::DocumentFormat;
use novelty_engine::pipeline::NoveltyReport;

use crate::error::ApiError;
use crate::state::AppState;

// =============================================================================
// Request types
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct CheckRequest {
    /// Optional key of an already-stored proposal to exclude from its own
    /// neighbor set, so a stored record can be re-checked against the rest
    /// of the corpus.
    pub key: Option<String>,
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct EvaluateRequest {
    pub key: String,
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct IngestRequest {
    pub key: Option<String>,
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct DocumentParams {
    /// Format tag for the raw request body: pdf, docx, or txt.
    pub format: String,
    pub key: Option<String>,
}

// =============================================================================
// Response types
// =============================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct CheckResponse {
    pub novelty_score: f64,
    pub interpretation: String,
    pub total_checked: u64,
    /// Nearest neighbors with similarity as a 0-1 fraction.
    pub neighbors: Vec<NeighborMatch>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct NeighborPercentage {
    pub key: String,
    /// Similarity as a 0-100 percentage, rounded to 2 decimals.
    pub similarity_percentage: f64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EvaluateResponse {
    pub key: String,
    pub novelty_score: f64,
    pub interpretation: String,
    pub total_checked: u64,
    pub neighbors: Vec<NeighborPercentage>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct IngestResponse {
    pub id: i64,
    pub key: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub total_proposals: u64,
}

impl From<NoveltyReport> for CheckResponse {
    fn from(report: NoveltyReport) -> Self {
        Self {
            novelty_score: report.score,
            interpretation: report.interpretation.as_str().to_string(),
            total_checked: report.total_checked,
            neighbors: report.neighbors,
        }
    }
}

fn to_percentage(similarity: f64) -> f64 {
    (similarity * 10_000.0).round() / 100.0
}

/// Fallback key for ingestion without one: a digest of the text, so repeat
/// submissions of identical content coalesce in upsert mode.
fn derive_key(text: &str) -> String {
    let mut hasher = DefaultHasher::new();
    text.hash(&mut hasher);
    format!("doc-{:016x}", hasher.finish())
}

// =============================================================================
// Handler functions
// =============================================================================

/// POST /check - read-only novelty check; the text is never persisted.
pub async fn check(
    State(state): State<AppState>,
    Json(req): Json<CheckRequest>,
) -> Result<Json<CheckResponse>, ApiError> {
    let report = state.pipeline.check(&req.text, req.key.as_deref()).await?;
    Ok(Json(report.into()))
}

/// POST /evaluate - store the submission under its key, then score it
/// against the rest of the corpus. Percentage presentation.
pub async fn evaluate(
    State(state): State<AppState>,
    Json(req): Json<EvaluateRequest>,
) -> Result<Json<EvaluateResponse>, ApiError> {
    let report = state.pipeline.evaluate(&req.key, &req.text).await?;

    Ok(Json(EvaluateResponse {
        key: req.key,
        novelty_score: report.score,
        interpretation: report.interpretation.as_str().to_string(),
        total_checked: report.total_checked,
        neighbors: report
            .neighbors
            .into_iter()
            .map(|n| NeighborPercentage {
                key: n.key,
                similarity_percentage: to_percentage(n.similarity),
            })
            .collect(),
    }))
}

/// POST /ingest - persist a proposal without scoring it.
pub async fn ingest(
    State(state): State<AppState>,
    Json(req): Json<IngestRequest>,
) -> Result<Json<IngestResponse>, ApiError> {
    let key = match req.key {
        Some(ref k) if !k.trim().is_empty() => k.clone(),
        _ => derive_key(&req.text),
    };

    let id = state.pipeline.ingest(&key, &req.text).await?;
    Ok(Json(IngestResponse { id, key }))
}

/// POST /check/document?format= - run a raw document body through the
/// extraction collaborator, then the read-only check flow.
pub async fn check_document(
    State(state): State<AppState>,
    Query(params): Query<DocumentParams>,
    body: Bytes,
) -> Result<Json<CheckResponse>, ApiError> {
    let format = DocumentFormat::from_tag(&params.format)?;
    let text = state.extractor.extract(&body, format)?;

    let report = state.pipeline.check(&text, params.key.as_deref()).await?;
    Ok(Json(report.into()))
}

/// POST /ingest/document?format=&key= - extract a raw document body and
/// persist it without scoring.
pub async fn ingest_document(
    State(state): State<AppState>,
    Query(params): Query<DocumentParams>,
    body: Bytes,
) -> Result<Json<IngestResponse>, ApiError> {
    let format = DocumentFormat::from_tag(&params.format)?;
    let text = state.extractor.extract(&body, format)?;

    let key = match params.key {
        Some(ref k) if !k.trim().is_empty() => k.clone(),
        _ => derive_key(&text),
    };

    let id = state.pipeline.ingest(&key, &text).await?;
    Ok(Json(IngestResponse { id, key }))
}

/// GET /proposals/{key} - stored record for a key (latest revision in
/// append mode).
pub async fn get_proposal(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<Proposal>, ApiError> {
    match state.repository.find_by_key(&key)? {
        Some(proposal) => Ok(Json(proposal)),
        None => Err(ApiError::NotFound(format!("No proposal with key '{}'", key))),
    }
}

/// GET /health - liveness plus corpus size.
pub async fn health(State(state): State<AppState>) -> Result<Json<HealthResponse>, ApiError> {
    let total = state.repository.count()?;
    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        total_proposals: total,
    }))
}
