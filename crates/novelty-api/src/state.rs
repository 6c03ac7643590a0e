//! Application state shared across all route handlers.
//!
//! AppState holds references to all services and shared resources.
//! It is passed to handlers via axum's State extractor.

use std::sync::Arc;

use novelty_core::config::NoveltyConfig;
use novelty_engine::extract::{PlainTextExtractor, TextExtractor};
use novelty_engine::pipeline::NoveltyPipeline;
use novelty_store::ProposalRepository;

/// Shared application state.
///
/// All fields use `Arc` for cheap cloning across handler tasks. The
/// embedding model lives inside the pipeline; it is loaded once at startup
/// and shared, never re-initialized per request.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<NoveltyConfig>,
    /// Proposal repository, for lookups that bypass the scoring pipeline.
    pub repository: Arc<ProposalRepository>,
    /// The validate/embed/persist/score pipeline.
    pub pipeline: Arc<NoveltyPipeline>,
    /// Document text extraction collaborator.
    pub extractor: Arc<dyn TextExtractor>,
}

impl AppState {
    /// Create a new AppState with the given components and the plain-text
    /// extraction backend.
    pub fn new(
        config: NoveltyConfig,
        repository: Arc<ProposalRepository>,
        pipeline: NoveltyPipeline,
    ) -> Self {
        Self {
            config: Arc::new(config),
            repository,
            pipeline: Arc::new(pipeline),
            extractor: Arc::new(PlainTextExtractor::new()),
        }
    }

    /// Replace the extraction backend (e.g. one that handles PDF/DOCX).
    pub fn with_extractor(mut self, extractor: Arc<dyn TextExtractor>) -> Self {
        self.extractor = extractor;
        self
    }
}
