//! Per-request novelty pipeline.
//!
//! `NoveltyPipeline` coordinates the embedding provider, the proposal
//! repository, and the scoring math for the three request flows: read-only
//! checks, evaluate (store then compare), and plain ingestion.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use novelty_core::error::NoveltyError;
use novelty_core::types::NeighborMatch;
use novelty_embed::embedding::DynEmbeddingService;
use novelty_store::ProposalRepository;

use crate::scoring::{novelty_score, Interpretation};

/// Outcome of a novelty check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoveltyReport {
    /// 0-100 score; higher means less similar to the corpus.
    pub score: f64,
    pub interpretation: Interpretation,
    /// Nearest neighbors considered, best match first.
    pub neighbors: Vec<NeighborMatch>,
    /// Corpus size at check time.
    pub total_checked: u64,
}

/// The request orchestrator: validate, embed, persist (where the flow asks
/// for it), query neighbors, score.
///
/// Holds the embedder behind `Arc<dyn DynEmbeddingService>` so one
/// expensive model load is shared by every request; the repository is the
/// only other collaborator and owns all persistence semantics.
pub struct NoveltyPipeline {
    embedder: Arc<dyn DynEmbeddingService>,
    repository: Arc<ProposalRepository>,
    neighbor_limit: usize,
    min_text_chars: usize,
}

impl NoveltyPipeline {
    pub fn new(
        embedder: Arc<dyn DynEmbeddingService>,
        repository: Arc<ProposalRepository>,
        neighbor_limit: usize,
        min_text_chars: usize,
    ) -> Self {
        Self {
            embedder,
            repository,
            neighbor_limit,
            min_text_chars,
        }
    }

    /// Create a pipeline with the standard limits (5 neighbors, 10 chars).
    pub fn with_defaults(
        embedder: Arc<dyn DynEmbeddingService>,
        repository: Arc<ProposalRepository>,
    ) -> Self {
        Self::new(embedder, repository, 5, 10)
    }

    /// Read-only novelty check: the submitted text is never persisted.
    ///
    /// `exclude_key` lets a caller re-check an already-stored proposal
    /// against the rest of the corpus without it matching itself.
    pub async fn check(
        &self,
        text: &str,
        exclude_key: Option<&str>,
    ) -> Result<NoveltyReport, NoveltyError> {
        self.validate_text(text)?;

        let total = self.repository.count()?;
        if total == 0 {
            debug!("Empty corpus, returning maximal novelty");
            return Ok(NoveltyReport {
                score: 100.0,
                interpretation: Interpretation::from_score(100.0),
                neighbors: Vec::new(),
                total_checked: 0,
            });
        }

        let embedding = self.embedder.embed_boxed(text).await?;
        let neighbors =
            self.repository
                .find_similar(&embedding, exclude_key, self.neighbor_limit)?;

        Ok(self.report(neighbors, total))
    }

    /// Store-then-compare: persist the submission under `key`, then score
    /// it against the rest of the corpus (its own record excluded).
    pub async fn evaluate(&self, key: &str, text: &str) -> Result<NoveltyReport, NoveltyError> {
        self.validate_text(text)?;
        self.validate_key(key)?;

        let embedding = self.embedder.embed_boxed(text).await?;
        let id = self.repository.save(key, text, &embedding)?;
        info!(key, id, "Proposal recorded for evaluation");

        // Count after the write, so the submission itself is included.
        let total = self.repository.count()?;
        let neighbors =
            self.repository
                .find_similar(&embedding, Some(key), self.neighbor_limit)?;

        Ok(self.report(neighbors, total))
    }

    /// Persist a submission without scoring it. Returns the row id.
    pub async fn ingest(&self, key: &str, text: &str) -> Result<i64, NoveltyError> {
        self.validate_text(text)?;
        self.validate_key(key)?;

        let embedding = self.embedder.embed_boxed(text).await?;
        let id = self.repository.save(key, text, &embedding)?;
        info!(key, id, "Proposal ingested");
        Ok(id)
    }

    fn report(&self, neighbors: Vec<NeighborMatch>, total: u64) -> NoveltyReport {
        let similarities: Vec<f64> = neighbors.iter().map(|n| n.similarity).collect();
        let score = novelty_score(&similarities);

        NoveltyReport {
            score,
            interpretation: Interpretation::from_score(score),
            neighbors,
            total_checked: total,
        }
    }

    fn validate_text(&self, text: &str) -> Result<(), NoveltyError> {
        if text.trim().chars().count() < self.min_text_chars {
            return Err(NoveltyError::validation(
                "text",
                format!(
                    "Text is too short. Please provide at least {} characters.",
                    self.min_text_chars
                ),
            ));
        }
        Ok(())
    }

    fn validate_key(&self, key: &str) -> Result<(), NoveltyError> {
        if key.trim().is_empty() {
            return Err(NoveltyError::validation(
                "key",
                "Key is required and cannot be empty.",
            ));
        }
        Ok(())
    }
}
